// src/utils/i18n.rs

use serde::{Deserialize, Serialize};

/// Display languages. UZL (Uzbek Latin) is the base language: every piece of
/// content carries it, the other columns are optional translations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Uzl,
    Uzc,
    Ru,
}

impl Lang {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lang::Uzl => "uzl",
            Lang::Uzc => "uzc",
            Lang::Ru => "ru",
        }
    }

    /// Unknown codes fall back to the base language rather than erroring;
    /// language never affects anything but rendering.
    pub fn parse(code: &str) -> Lang {
        match code {
            "uzc" => Lang::Uzc,
            "ru" => Lang::Ru,
            _ => Lang::Uzl,
        }
    }
}

impl Default for Lang {
    fn default() -> Self {
        Lang::Uzl
    }
}

/// Resolves a translated value against the base-language value.
/// Missing or empty translations fall back to the base text.
pub fn resolve<'a>(base: &'a str, localized: Option<&'a str>) -> &'a str {
    match localized {
        Some(text) if !text.is_empty() => text,
        _ => base,
    }
}

/// Same fallback for values that are optional even in the base language
/// (e.g. explanations).
pub fn resolve_opt<'a>(base: Option<&'a str>, localized: Option<&'a str>) -> Option<&'a str> {
    match localized {
        Some(text) if !text.is_empty() => Some(text),
        _ => base.filter(|text| !text.is_empty()),
    }
}

/// Picks the column for `lang` out of the (uzl, uzc, ru) triple.
pub fn pick<'a>(
    lang: Lang,
    uzl: &'a str,
    uzc: Option<&'a str>,
    ru: Option<&'a str>,
) -> &'a str {
    match lang {
        Lang::Uzl => uzl,
        Lang::Uzc => resolve(uzl, uzc),
        Lang::Ru => resolve(uzl, ru),
    }
}

/// `pick` for optional base values.
pub fn pick_opt<'a>(
    lang: Lang,
    uzl: Option<&'a str>,
    uzc: Option<&'a str>,
    ru: Option<&'a str>,
) -> Option<&'a str> {
    match lang {
        Lang::Uzl => uzl.filter(|text| !text.is_empty()),
        Lang::Uzc => resolve_opt(uzl, uzc),
        Lang::Ru => resolve_opt(uzl, ru),
    }
}
