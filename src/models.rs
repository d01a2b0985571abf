use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub date: String, // DD.MM.YYYY
    pub time: String,
    pub title: String,
    pub url: String,
    pub identity_key: String, // "{date} {time} | {title} | {url}"
}

impl Event {
    pub fn starts_at(&self) -> String {
        format!("{} {}", self.date, self.time)
    }
}

/// Year and month taken from a month-bucket container (or a fully dated table row).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthHint {
    pub year: String,
    pub month: String,
}

/// Unparsed fields of one listing node, before assembly.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawCandidate {
    pub day_text: String,
    pub time_text: String,
    pub title_text: String,
    pub href: String,
    pub hint: Option<MonthHint>,
}
