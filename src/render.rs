//! Plain-text rendering for daybook types.

use daybook_core::{Calendar, ScheduleView, User};

pub trait Render {
    fn render(&self) -> String;
}

impl Render for User {
    fn render(&self) -> String {
        match &self.nickname {
            Some(nickname) => format!("#{} {} ({})", self.id, self.email, nickname),
            None => format!("#{} {}", self.id, self.email),
        }
    }
}

impl Render for Calendar {
    fn render(&self) -> String {
        format!("#{} {}", self.id, self.title)
    }
}

impl Render for ScheduleView {
    fn render(&self) -> String {
        let mut line = format!("#{} {}", self.id, self.start_date);
        if let Some(start) = self.start_time {
            line.push_str(&format!(" {}", start.format("%H:%M")));
        }

        let end_date = self.end_date.filter(|d| *d != self.start_date);
        if end_date.is_some() || self.end_time.is_some() {
            line.push_str(" -");
            if let Some(end) = end_date {
                line.push_str(&format!(" {end}"));
            }
            if let Some(end) = self.end_time {
                line.push_str(&format!(" {}", end.format("%H:%M")));
            }
        }

        line.push_str(&format!("  {} [{}]", self.title, self.calendar.title));
        if self.is_repeat {
            line.push_str(" (repeats)");
        }
        line
    }
}

/// One rendered item per line, or `empty` when there is nothing to show.
pub fn render_list<T: Render>(items: &[T], empty: &str) -> String {
    if items.is_empty() {
        return empty.to_string();
    }
    items
        .iter()
        .map(Render::render)
        .collect::<Vec<_>>()
        .join("\n")
}
