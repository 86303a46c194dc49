//! Serializable filter recipes for HXL pipelines.
//!
//! `hxl-recipe` describes a filter chain as data: an ordered list of
//! [`FilterStep`]s that can be stored as JSON or YAML, read from the
//! numbered parameters of a filter form, checked up front and then
//! applied to any [`hxl_core::Source`].
//!
//! # Quick Start
//!
//! ```rust
//! use hxl_core::{Dataset, Source};
//! use hxl_recipe::Recipe;
//!
//! let recipe = Recipe::from_json(r##"{
//!     "steps": [
//!         { "filter": "cut", "exclude": ["#contact"] },
//!         { "filter": "rename", "pattern": "#org", "tagspec": "#org+impl" }
//!     ]
//! }"##)
//! .unwrap();
//! recipe.validate().unwrap();
//!
//! let data = Dataset::new(vec![
//!     vec!["#org", "#contact"],
//!     vec!["MSF", "someone@example.org"],
//! ])
//! .unwrap();
//! let result = recipe.apply(&data).unwrap();
//! assert_eq!(result.display_tags().unwrap(), vec![Some("#org+impl".to_string())]);
//! ```
//!
//! # Form parameters
//!
//! | Filter (`filterNN`) | Parameters |
//! |---------------------|------------|
//! | `select`, `rows` | `select-queryNN-01` .. `-05`, `select-reverseNN=on` |
//! | `cut`, `column` | `cut-include-tagsNN`, `cut-exclude-tagsNN` |
//! | `count` | `count-tagsNN`, `count-aggregate-tagNN` |
//! | `rename` | `rename-oldtagNN`, `rename-newtagNN`, `rename-headerNN`, `rename-indexNN` |
//! | `index` | `index-tagsNN` |
//! | `sort` | `sort-tagsNN`, `sort-reverseNN=on` |
//! | `add` | `add-tagNN`, `add-headerNN`, `add-valueNN`, `add-beforeNN=on` |
//! | `clean` | `clean-whitespace-tagsNN`, `clean-upper-tagsNN`, `clean-lower-tagsNN` |
//! | `cache` | none |
//!
//! Tag lists are comma-separated. The leading `#` of `rename-newtagNN`
//! and `add-tagNN` may be omitted.

mod error;
mod recipe;
mod step;

pub use error::{RecipeError, Result};
pub use recipe::{Recipe, DEFAULT_FILTER_COUNT, MAX_FILTER_COUNT, MAX_SELECT_QUERIES};
pub use step::{BoxedSource, FilterStep};
