use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::utils::time_utils::{end_of_month, start_of_month};

/// Where to send the user after a form is submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Bookmark {
    #[default]
    NoBookmark,
    Bookmarked(String),
    /// The next form render keeps the current bookmark (if any) instead of
    /// overwriting it with the referrer.
    SuppressedOnce(Option<String>),
}

impl Bookmark {
    pub fn url(&self) -> Option<&str> {
        match self {
            Bookmark::NoBookmark => None,
            Bookmark::Bookmarked(url) => Some(url.as_str()),
            Bookmark::SuppressedOnce(url) => url.as_deref(),
        }
    }

    /// Called when the form is rendered. Records `referrer` unless the
    /// previous submission asked to keep the bookmark; the suppression is
    /// cleared either way.
    pub fn form_shown(&mut self, referrer: &str) {
        *self = match std::mem::take(self) {
            Bookmark::SuppressedOnce(Some(url)) => Bookmark::Bookmarked(url),
            Bookmark::SuppressedOnce(None) => Bookmark::NoBookmark,
            _ => Bookmark::Bookmarked(referrer.to_string()),
        };
    }

    /// Called after a write when the user returns to the same form.
    pub fn suppress_next(&mut self) {
        let url = self.url().map(str::to_string);
        *self = Bookmark::SuppressedOnce(url);
    }

    /// Takes the bookmark for the final redirect, leaving none behind.
    pub fn consume(&mut self) -> Option<String> {
        match std::mem::take(self) {
            Bookmark::NoBookmark => None,
            Bookmark::Bookmarked(url) => Some(url),
            Bookmark::SuppressedOnce(url) => url,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

/// One-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}

/// Submitted form values kept for the form the user is redirected back to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OldInput {
    pub name: Option<String>,
    pub return_to_edit: bool,
}

/// Session state of one user.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub create: Bookmark,
    pub edit: Bookmark,
    pub delete: Bookmark,
    flash: Option<FlashMessage>,
    old_input: Option<OldInput>,
}

impl SessionContext {
    /// The selected period start, or the first day of `today`'s month.
    pub fn active_start(&self, today: NaiveDate) -> NaiveDate {
        self.start.unwrap_or_else(|| start_of_month(today))
    }

    /// The selected period end, or the last day of the active start's month.
    pub fn active_end(&self, today: NaiveDate) -> NaiveDate {
        self.end
            .unwrap_or_else(|| end_of_month(self.active_start(today)))
    }

    pub fn set_period(&mut self, start: NaiveDate, end: Option<NaiveDate>) {
        self.start = Some(start);
        self.end = end;
    }

    pub fn flash_success(&mut self, message: impl Into<String>) {
        self.flash = Some(FlashMessage {
            level: FlashLevel::Success,
            message: message.into(),
        });
    }

    pub fn take_flash(&mut self) -> Option<FlashMessage> {
        self.flash.take()
    }

    pub fn keep_input(&mut self, input: OldInput) {
        self.old_input = Some(input);
    }

    pub fn take_old_input(&mut self) -> OldInput {
        self.old_input.take().unwrap_or_default()
    }
}
