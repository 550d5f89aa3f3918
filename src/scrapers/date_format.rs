use chrono::format::{self, Parsed, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime};

/// Hour given to dates parsed from a format without an hour token
pub const DEFAULT_HOUR: u32 = 12;

/// A site date format translated to a `chrono` pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    pattern: String,
    has_hour: bool,
    has_minute: bool,
}

impl DateFormat {
    /// Translate a PHP-style format. Unknown letters are kept as literals.
    ///
    /// `h` and `g` read a 12-hour clock only when the format also has an
    /// `A`/`a` meridiem, otherwise they read the hour as is.
    pub fn new(format: &str) -> Self {
        let twelve_hour = has_meridiem(format);
        let mut pattern = String::with_capacity(format.len() * 2);
        let mut has_hour = false;
        let mut has_minute = false;
        let mut chars = format.chars();

        while let Some(c) = chars.next() {
            let token = match c {
                'd' | 'j' => "%d",
                'm' | 'n' => "%m",
                'Y' => "%Y",
                'y' => "%y",
                'M' => "%b",
                'F' => "%B",
                'D' => "%a",
                'l' => "%A",
                'H' | 'G' => {
                    has_hour = true;
                    "%H"
                }
                'h' | 'g' => {
                    has_hour = true;
                    if twelve_hour {
                        "%I"
                    } else {
                        "%H"
                    }
                }
                'i' => {
                    has_minute = true;
                    "%M"
                }
                's' => "%S",
                'A' | 'a' => "%p",
                '%' => "%%",
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        push_literal(&mut pattern, escaped);
                    }
                    continue;
                }
                other => {
                    push_literal(&mut pattern, other);
                    continue;
                }
            };
            pattern.push_str(token);
        }

        Self {
            pattern,
            has_hour,
            has_minute,
        }
    }

    /// Whether the format carries an hour-of-day token
    pub fn has_hour(&self) -> bool {
        self.has_hour
    }

    /// Parse `text`; date-only formats are set to [`DEFAULT_HOUR`] o'clock
    /// and an hour without minutes is on the hour.
    pub fn parse(&self, text: &str) -> Option<NaiveDateTime> {
        let mut parsed = Parsed::new();
        format::parse(&mut parsed, text.trim(), StrftimeItems::new(&self.pattern)).ok()?;
        let date: NaiveDate = parsed.to_naive_date().ok()?;
        if !self.has_hour {
            return date.and_hms_opt(DEFAULT_HOUR, 0, 0);
        }
        if !self.has_minute {
            parsed.set_minute(0).ok()?;
        }
        let time = parsed.to_naive_time().ok()?;
        Some(date.and_time(time))
    }
}

fn has_meridiem(format: &str) -> bool {
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            'A' | 'a' => return true,
            _ => {}
        }
    }
    false
}

fn push_literal(pattern: &mut String, c: char) {
    if c == '%' {
        pattern.push_str("%%");
    } else {
        pattern.push(c);
    }
}
