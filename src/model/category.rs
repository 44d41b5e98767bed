use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The closed set of categories a transaction can be filed under.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
pub enum Category {
    Food,
    Transport,
    Entertainment,
    Shopping,
    Bills,
    #[default]
    Other,
}

impl Category {
    /// Every category, in the order they are offered to the user.
    pub const ALL: [Category; 6] = [
        Category::Food,
        Category::Transport,
        Category::Entertainment,
        Category::Shopping,
        Category::Bills,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => FOOD_STR,
            Category::Transport => TRANSPORT_STR,
            Category::Entertainment => ENTERTAINMENT_STR,
            Category::Shopping => SHOPPING_STR,
            Category::Bills => BILLS_STR,
            Category::Other => OTHER_STR,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when text does not name one of the known categories.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct UnknownCategory(String);

impl Display for UnknownCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let known: Vec<&str> = Category::ALL.iter().map(Category::as_str).collect();
        write!(
            f,
            "Unknown category '{}', expected one of: {}",
            self.0,
            known.join(", ")
        )
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Case-insensitive, so `food` and `FOOD` both name `Category::Food`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

const FOOD_STR: &str = "Food";
const TRANSPORT_STR: &str = "Transport";
const ENTERTAINMENT_STR: &str = "Entertainment";
const SHOPPING_STR: &str = "Shopping";
const BILLS_STR: &str = "Bills";
const OTHER_STR: &str = "Other";
