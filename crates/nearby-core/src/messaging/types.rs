use crate::themes::ThemeGroup;

pub const UPDATE_LOCATION_LABEL: &str = "📍Update Location";
pub const ALL_CATEGORIES_LABEL: &str = "All Categories";

/// Reply keyboard shown under the message input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplyKeyboard {
    pub rows: Vec<Vec<KeyboardButton>>,
    pub one_time: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyboardButton {
    Text(String),
    /// Asks the client to share the user's current location.
    RequestLocation(String),
}

impl KeyboardButton {
    pub fn label(&self) -> &str {
        match self {
            KeyboardButton::Text(s) | KeyboardButton::RequestLocation(s) => s,
        }
    }
}

impl ReplyKeyboard {
    /// Category groups, two per row, plus the location-share button.
    pub fn main_menu() -> Self {
        let mut rows: Vec<Vec<KeyboardButton>> = ThemeGroup::ALL
            .chunks(2)
            .map(|pair| {
                pair.iter()
                    .map(|g| KeyboardButton::Text(g.label().to_string()))
                    .collect()
            })
            .collect();
        rows.push(vec![KeyboardButton::RequestLocation(
            UPDATE_LOCATION_LABEL.to_string(),
        )]);
        Self {
            rows,
            one_time: false,
        }
    }

    /// The categories of one group, followed by a way back to the main menu.
    pub fn group_menu(group: ThemeGroup) -> Self {
        let mut rows: Vec<Vec<KeyboardButton>> = group
            .rows()
            .iter()
            .map(|row| {
                row.iter()
                    .map(|t| KeyboardButton::Text(t.label().to_string()))
                    .collect()
            })
            .collect();
        rows.push(vec![KeyboardButton::Text(ALL_CATEGORIES_LABEL.to_string())]);
        Self {
            rows,
            one_time: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(kb: &ReplyKeyboard) -> Vec<Vec<&str>> {
        kb.rows
            .iter()
            .map(|r| r.iter().map(|b| b.label()).collect())
            .collect()
    }

    #[test]
    fn main_menu_layout() {
        let kb = ReplyKeyboard::main_menu();
        assert_eq!(
            labels(&kb),
            vec![
                vec!["Education", "Recreation"],
                vec!["Community", "Health"],
                vec!["Cultural", "Emergency"],
                vec!["📍Update Location"],
            ]
        );
        assert!(matches!(
            kb.rows[3][0],
            KeyboardButton::RequestLocation(_)
        ));
        assert!(!kb.one_time);
    }

    #[test]
    fn group_menu_ends_with_all_categories() {
        let kb = ReplyKeyboard::group_menu(ThemeGroup::Community);
        assert_eq!(
            labels(&kb),
            vec![
                vec!["Hawker Centres", "Childcare"],
                vec!["Supermarkets", "Money Changer"],
                vec!["Gyms", "RC", "CC"],
                vec!["All Categories"],
            ]
        );
        assert!(kb.one_time);
    }
}
