pub mod comparison;
pub mod error;
pub mod expr;
pub mod inputs;
pub mod page;
pub mod paths;

pub use comparison::{
    BooleanComparison, EnumComparison, JsonComparison, NumberComparison, TextComparison,
    TimeComparison,
};
pub use error::FilterError;
pub use expr::{BooleanBuilder, Expr, Leaf};
pub use page::{order_by_sql, KeyValuePair, Page, PaginationInput};
