//! Poetry styles and the instructions sent to the model for each.

use clap::ValueEnum;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PoetryStyle {
    /// عمودي: metered, rhymed classical verse
    Classical,
    /// حر: free verse
    Free,
    /// نبطي: Gulf vernacular verse
    Nabati,
    General,
}

impl PoetryStyle {
    pub const CLASSICAL: &'static str = "عمودي";
    pub const FREE: &'static str = "حر";
    pub const NABATI: &'static str = "نبطي";

    /// Anything that isn't one of the known selectors, including no
    /// selector at all, falls back to the general style.
    pub fn from_selector(selector: Option<&str>) -> Self {
        match selector.map(str::trim) {
            Some(Self::CLASSICAL) => PoetryStyle::Classical,
            Some(Self::FREE) => PoetryStyle::Free,
            Some(Self::NABATI) => PoetryStyle::Nabati,
            _ => PoetryStyle::General,
        }
    }

    /// The selector sent over the wire. `None` for the general style.
    pub fn selector(&self) -> Option<&'static str> {
        match self {
            PoetryStyle::Classical => Some(Self::CLASSICAL),
            PoetryStyle::Free => Some(Self::FREE),
            PoetryStyle::Nabati => Some(Self::NABATI),
            PoetryStyle::General => None,
        }
    }

    pub fn system_prompt(&self) -> &'static str {
        match self {
            PoetryStyle::Classical => {
                "أنت شاعر عربي متمكن في الشعر العمودي الكلاسيكي. اكتب قصيدة عمودية جميلة بالعربية الفصحى مع الالتزام بالوزن والقافية. القصيدة يجب أن تكون من 6-8 أبيات على الأقل."
            }
            PoetryStyle::Free => {
                "أنت شاعر عربي متمكن في الشعر الحر. اكتب قصيدة حرة جميلة ومعبرة بالعربية الفصحى. القصيدة يجب أن تكون متوسطة الطول."
            }
            PoetryStyle::Nabati => {
                "أنت شاعر نبطي متمكن. اكتب قصيدة نبطية جميلة باللهجة الخليجية مع الالتزام بالوزن والقافية. القصيدة يجب أن تكون من 6-8 أبيات على الأقل."
            }
            PoetryStyle::General => {
                "أنت شاعر عربي متمكن. اكتب قصيدة جميلة ومعبرة بالعربية. القصيدة يجب أن تكون متوسطة الطول."
            }
        }
    }
}

pub fn user_prompt(topic: &str) -> String {
    format!("اكتب قصيدة عن: {}", topic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_maps_known_selectors() {
        assert_eq!(
            PoetryStyle::from_selector(Some("عمودي")),
            PoetryStyle::Classical
        );
        assert_eq!(PoetryStyle::from_selector(Some("حر")), PoetryStyle::Free);
        assert_eq!(PoetryStyle::from_selector(Some("نبطي")), PoetryStyle::Nabati);
    }

    #[test]
    fn it_falls_back_to_general_style() {
        assert_eq!(PoetryStyle::from_selector(None), PoetryStyle::General);
        assert_eq!(
            PoetryStyle::from_selector(Some("sonnet")),
            PoetryStyle::General
        );
        assert!(
            PoetryStyle::General
                .system_prompt()
                .starts_with("أنت شاعر عربي متمكن.")
        );
    }

    #[test]
    fn it_round_trips_selectors() {
        for style in [
            PoetryStyle::Classical,
            PoetryStyle::Free,
            PoetryStyle::Nabati,
            PoetryStyle::General,
        ] {
            assert_eq!(PoetryStyle::from_selector(style.selector()), style);
        }
    }

    #[test]
    fn it_builds_user_prompt() {
        assert_eq!(user_prompt("البحر"), "اكتب قصيدة عن: البحر");
    }
}
