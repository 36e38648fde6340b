//! Theme name variants substituted into template files
//!
//! A template refers to the theme through tokens such as `{{dash}}` or
//! `{{spaceUpper}}`. Every variant is derived from the dashed theme name.

/// The spellings of a theme name a template can ask for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeNames {
    /// `my-wp-theme`
    pub dash: String,
    /// `my_wp-theme`, only the first dash is replaced
    pub underscore: String,
    /// `My_Wp_Theme`
    pub underscore_upper: String,
    /// `My Wp Theme`
    pub space: String,
    /// `MY_WP-THEME`
    pub space_upper: String,
}

/// Uppercase the first character, keep the rest
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn capitalized_words(name: &str, separator: &str) -> String {
    name.split('-')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(separator)
}

impl ThemeNames {
    pub fn new(name: &str) -> Self {
        let underscore = name.replacen('-', "_", 1);
        Self {
            dash: name.to_string(),
            space_upper: underscore.to_uppercase(),
            underscore,
            underscore_upper: capitalized_words(name, "_"),
            space: capitalized_words(name, " "),
        }
    }

    /// `(token, value)` pairs in substitution order
    pub fn tokens(&self) -> [(&'static str, &str); 5] {
        [
            ("{{dash}}", self.dash.as_str()),
            ("{{underscoreUpper}}", self.underscore_upper.as_str()),
            ("{{underscore}}", self.underscore.as_str()),
            ("{{spaceUpper}}", self.space_upper.as_str()),
            ("{{space}}", self.space.as_str()),
        ]
    }

    /// Replace every token in `text`
    pub fn substitute(&self, text: &str) -> String {
        self.tokens()
            .iter()
            .fold(text.to_string(), |acc, (token, value)| acc.replace(token, value))
    }
}
