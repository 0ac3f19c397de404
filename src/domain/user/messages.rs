//! Human-readable validation messages

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::validation::{ErrorKind, Field};

/// Language used when rendering validation messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageLocale {
    #[default]
    En,
    Ja,
}

impl MessageLocale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ja => "ja",
        }
    }
}

impl fmt::Display for MessageLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageLocale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" => Ok(Self::En),
            "ja" => Ok(Self::Ja),
            other => Err(format!("Unsupported message locale: '{}'", other)),
        }
    }
}

/// Display label of a field
pub fn field_label(field: Field, locale: MessageLocale) -> &'static str {
    match (locale, field) {
        (MessageLocale::En, Field::Name) => "Name",
        (MessageLocale::En, Field::Email) => "Email",
        (MessageLocale::En, Field::Password) => "Password",
        (MessageLocale::Ja, Field::Name) => "名前",
        (MessageLocale::Ja, Field::Email) => "メールアドレス",
        (MessageLocale::Ja, Field::Password) => "パスワード",
    }
}

/// Message for an error kind, without the field label
pub fn message(kind: &ErrorKind, locale: MessageLocale) -> String {
    match locale {
        MessageLocale::En => match kind {
            ErrorKind::Blank => "can't be blank".to_string(),
            ErrorKind::TooLong { max } => {
                format!("is too long (maximum is {} characters)", max)
            }
            ErrorKind::TooShort { min } => {
                format!("is too short (minimum is {} characters)", min)
            }
            ErrorKind::InvalidFormat => "is invalid".to_string(),
            ErrorKind::Taken => "has already been taken".to_string(),
        },
        MessageLocale::Ja => match kind {
            ErrorKind::Blank => "を入力してください".to_string(),
            ErrorKind::TooLong { max } => format!("は{}文字以内で入力してください", max),
            ErrorKind::TooShort { min } => format!("は{}文字以上で入力してください", min),
            ErrorKind::InvalidFormat => "は不正な値です".to_string(),
            ErrorKind::Taken => "はすでに存在します".to_string(),
        },
    }
}

/// Message prefixed with the field label
pub fn full_message(field: Field, kind: &ErrorKind, locale: MessageLocale) -> String {
    let label = field_label(field, locale);
    let body = message(kind, locale);

    match locale {
        MessageLocale::En => format!("{} {}", label, body),
        MessageLocale::Ja => format!("{}{}", label, body),
    }
}
