//! Resolve calendar-title filters into calendar ids.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::model::{Calendar, CalendarId, UserId};

/// Which of the requester's calendars a query may draw schedules from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarScope {
    /// Every calendar the requester owns.
    All,
    /// Only these calendar ids. May be empty, in which case nothing matches.
    Only(BTreeSet<CalendarId>),
}

impl CalendarScope {
    pub fn contains(&self, id: CalendarId) -> bool {
        match self {
            CalendarScope::All => true,
            CalendarScope::Only(ids) => ids.contains(&id),
        }
    }
}

/// Map `titles` onto the ids of `owner`'s calendars.
///
/// No titles (or only blank ones) means no restriction. Titles that match none of the owner's
/// calendars contribute nothing and are not an error. Calendars belonging to
/// other users are ignored even when their title matches.
pub fn resolve_calendar_ids<S: AsRef<str>>(
    owner: UserId,
    calendars: &[Calendar],
    titles: &[S],
) -> CalendarScope {
    let wanted: BTreeSet<&str> = titles
        .iter()
        .map(|t| t.as_ref().trim())
        .filter(|t| !t.is_empty())
        .collect();
    if wanted.is_empty() {
        return CalendarScope::All;
    }

    let ids = calendars
        .iter()
        .filter(|cal| cal.owner == owner && wanted.contains(cal.title.as_str()))
        .map(|cal| cal.id)
        .collect();

    CalendarScope::Only(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calendars() -> Vec<Calendar> {
        vec![
            Calendar { id: 1, owner: 7, title: "Work".into() },
            Calendar { id: 2, owner: 7, title: "Personal".into() },
            Calendar { id: 3, owner: 8, title: "Work".into() },
        ]
    }

    #[test]
    fn no_titles_is_unrestricted() {
        let empty: [&str; 0] = [];
        assert_eq!(resolve_calendar_ids(7, &calendars(), &empty), CalendarScope::All);
    }

    #[test]
    fn blank_titles_are_ignored() {
        assert_eq!(resolve_calendar_ids(7, &calendars(), &["", "  "]), CalendarScope::All);

        let scope = resolve_calendar_ids(7, &calendars(), &["", "Personal"]);
        assert_eq!(scope, CalendarScope::Only(BTreeSet::from([2])));
    }

    #[test]
    fn titles_resolve_to_owned_ids_only() {
        let scope = resolve_calendar_ids(7, &calendars(), &["Work"]);
        assert_eq!(scope, CalendarScope::Only(BTreeSet::from([1])));
        assert!(!scope.contains(3));
    }

    #[test]
    fn unknown_titles_are_dropped() {
        let scope = resolve_calendar_ids(7, &calendars(), &["Work", "Holidays"]);
        assert_eq!(scope, CalendarScope::Only(BTreeSet::from([1])));

        let scope = resolve_calendar_ids(7, &calendars(), &["Holidays"]);
        assert_eq!(scope, CalendarScope::Only(BTreeSet::new()));
        assert!(!scope.contains(1));
    }
}
