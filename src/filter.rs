use crate::types::Hotspot;
use std::collections::BTreeSet;
use std::fmt;

/// Selector label for "no state filter".
pub const ALL_STATES: &str = "Todos os Estados";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StateSelection {
    #[default]
    All,
    State(String),
}

impl StateSelection {
    /// Map a selector label to a selection. The "all states" label (any case)
    /// and `all` mean no filter; anything else is a state name.
    pub fn parse(label: &str) -> Self {
        let label = label.trim();
        if label.is_empty()
            || label.eq_ignore_ascii_case(ALL_STATES)
            || label.eq_ignore_ascii_case("all")
        {
            StateSelection::All
        } else {
            StateSelection::State(label.to_string())
        }
    }
}

impl fmt::Display for StateSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateSelection::All => f.write_str(ALL_STATES),
            StateSelection::State(s) => f.write_str(s),
        }
    }
}

/// A borrowed, read-only subset of the cleaned records.
#[derive(Debug, Clone, Default)]
pub struct View<'a> {
    records: Vec<&'a Hotspot>,
}

impl<'a> View<'a> {
    pub fn all(data: &'a [Hotspot]) -> Self {
        View {
            records: data.iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Hotspot> + '_ {
        self.records.iter().copied()
    }

    pub fn records(&self) -> &[&'a Hotspot] {
        &self.records
    }
}

/// Apply the state selection. Order is preserved and a selection with no
/// matching record yields an empty view.
pub fn filter<'a>(data: &'a [Hotspot], selection: &StateSelection) -> View<'a> {
    match selection {
        StateSelection::All => View::all(data),
        StateSelection::State(state) => View {
            records: data.iter().filter(|h| &h.state == state).collect(),
        },
    }
}

/// Choices for the state selector: the "all states" label, then every
/// distinct state in ascending order.
pub fn state_options(data: &[Hotspot]) -> Vec<String> {
    let states: BTreeSet<&str> = data.iter().map(|h| h.state.as_str()).collect();
    std::iter::once(ALL_STATES.to_string())
        .chain(states.into_iter().map(str::to_string))
        .collect()
}
