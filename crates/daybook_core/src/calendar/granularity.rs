//! Journal granularities and hierarchy shape tables.
//!
//! # Responsibility
//! - Define the closed set of container granularities and their store
//!   vocabulary (labels, pattern labels, template relations).
//! - Define the parent lookup over the per-calendar-kind hierarchy chain.
//!
//! # Invariants
//! - Hierarchy chains are ordered root-most first and always end in `Day`.
//! - A granularity absent from the active chain has no parent level; callers
//!   fall back to day resolution instead of failing.

/// Container granularity of one journal note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Year,
    Month,
    Week,
    Day,
}

impl Granularity {
    /// Lowercase name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Week => "week",
            Self::Day => "day",
        }
    }

    /// Store label carrying the canonical value, e.g. `dateNote=2024-03-15`.
    pub fn label_name(self) -> &'static str {
        match self {
            Self::Year => "yearNote",
            Self::Month => "monthNote",
            Self::Week => "weekNote",
            Self::Day => "dateNote",
        }
    }

    /// Root label overriding the title pattern for this granularity.
    pub fn pattern_label(self) -> &'static str {
        match self {
            Self::Year => "yearPattern",
            Self::Month => "monthPattern",
            Self::Week => "weekPattern",
            Self::Day => "datePattern",
        }
    }

    /// Root relation naming the template for containers of this granularity.
    pub fn template_relation(self) -> &'static str {
        match self {
            Self::Year => "yearTemplate",
            Self::Month => "monthTemplate",
            Self::Week => "weekTemplate",
            Self::Day => "dateTemplate",
        }
    }

    /// Built-in title pattern used when the root defines no override.
    pub fn default_pattern(self) -> &'static str {
        match self {
            Self::Year => "{year}",
            Self::Month => "{monthNumberPadded} - {month}",
            Self::Week => "WW{weekNumber}",
            Self::Day => "{dayInMonthPadded} - {weekDay}",
        }
    }
}

/// Position a container's parent occupies in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentLevel {
    /// The calendar root itself.
    Root,
    /// A real container granularity resolved before the child.
    Container(Granularity),
}

/// Hierarchy shape selected by the root's `calendarType` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarKind {
    /// year -> month -> day
    Monthly,
    /// year -> week -> day
    Weekly,
}

const MONTHLY_CHAIN: &[Granularity] = &[Granularity::Year, Granularity::Month, Granularity::Day];
const WEEKLY_CHAIN: &[Granularity] = &[Granularity::Year, Granularity::Week, Granularity::Day];

impl CalendarKind {
    /// Parses the `calendarType` label vocabulary.
    pub fn parse_label(value: &str) -> Option<Self> {
        match value {
            "monthly" => Some(Self::Monthly),
            "weekly" => Some(Self::Weekly),
            _ => None,
        }
    }

    /// Active hierarchy chain, root-most granularity first.
    pub fn chain(self) -> &'static [Granularity] {
        match self {
            Self::Monthly => MONTHLY_CHAIN,
            Self::Weekly => WEEKLY_CHAIN,
        }
    }

    /// Parent level of `target` within this hierarchy.
    ///
    /// `None` means the granularity does not exist in this hierarchy at all
    /// (e.g. `Month` under a weekly calendar).
    pub fn parent_level(self, target: Granularity) -> Option<ParentLevel> {
        let chain = self.chain();
        let position = chain.iter().position(|level| *level == target)?;
        Some(match position {
            0 => ParentLevel::Root,
            _ => ParentLevel::Container(chain[position - 1]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{CalendarKind, Granularity, ParentLevel};

    #[test]
    fn monthly_chain_parents() {
        assert_eq!(
            CalendarKind::Monthly.parent_level(Granularity::Year),
            Some(ParentLevel::Root)
        );
        assert_eq!(
            CalendarKind::Monthly.parent_level(Granularity::Month),
            Some(ParentLevel::Container(Granularity::Year))
        );
        assert_eq!(
            CalendarKind::Monthly.parent_level(Granularity::Day),
            Some(ParentLevel::Container(Granularity::Month))
        );
        assert_eq!(CalendarKind::Monthly.parent_level(Granularity::Week), None);
    }

    #[test]
    fn weekly_chain_parents() {
        assert_eq!(
            CalendarKind::Weekly.parent_level(Granularity::Week),
            Some(ParentLevel::Container(Granularity::Year))
        );
        assert_eq!(
            CalendarKind::Weekly.parent_level(Granularity::Day),
            Some(ParentLevel::Container(Granularity::Week))
        );
        assert_eq!(CalendarKind::Weekly.parent_level(Granularity::Month), None);
    }
}
