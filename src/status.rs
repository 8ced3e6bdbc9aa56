use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::palette::{copy_base_palette, reorder_to_palette, ColorAssignment, DisplayColor};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experiment {
    pub id: String,
    #[serde(default)]
    pub queued: bool,
}

impl Experiment {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            queued: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColoredStatus {
    pub colored_status: HashMap<String, ColorAssignment>,
    pub available_colors: Vec<DisplayColor>,
}

/// Reassigns display colors after an experiment refresh. Surviving
/// experiments keep their exact previous assignment, colors of vanished
/// experiments return to the pool, and new running experiments claim from
/// the front of the pool until it is empty.
pub fn collect_colored_status(
    experiments: &[Experiment],
    checkpoints_by_tip: &HashMap<String, Vec<Experiment>>,
    previous_status: &HashMap<String, ColorAssignment>,
    previous_available: &[DisplayColor],
) -> ColoredStatus {
    let mut pool = unassign_dropped_colors(
        experiments,
        checkpoints_by_tip,
        previous_status,
        previous_available,
    );

    let mut colored_status = HashMap::new();
    for experiment in experiments {
        if experiment.queued {
            continue;
        }

        let assignment = match previous_status.get(&experiment.id) {
            Some(previous) => *previous,
            None if !pool.is_empty() => ColorAssignment::Assigned(pool.remove(0)),
            None => ColorAssignment::Unassigned,
        };
        colored_status.insert(experiment.id.clone(), assignment);

        let Some(checkpoints) = checkpoints_by_tip.get(&experiment.id) else {
            continue;
        };
        for checkpoint in checkpoints {
            let assignment = previous_status
                .get(&checkpoint.id)
                .copied()
                .unwrap_or(ColorAssignment::Unassigned);
            colored_status.insert(checkpoint.id.clone(), assignment);
        }
    }

    ColoredStatus {
        colored_status,
        available_colors: pool,
    }
}

fn unassign_dropped_colors(
    experiments: &[Experiment],
    checkpoints_by_tip: &HashMap<String, Vec<Experiment>>,
    previous_status: &HashMap<String, ColorAssignment>,
    previous_available: &[DisplayColor],
) -> Vec<DisplayColor> {
    let live_ids = experiments
        .iter()
        .map(|experiment| experiment.id.as_str())
        .chain(
            checkpoints_by_tip
                .values()
                .flatten()
                .map(|checkpoint| checkpoint.id.as_str()),
        )
        .collect::<HashSet<_>>();

    if live_ids.is_empty() {
        return copy_base_palette();
    }

    let mut pool = previous_available.iter().copied().collect::<HashSet<_>>();
    for (id, assignment) in previous_status {
        if live_ids.contains(id.as_str()) {
            continue;
        }
        if let Some(color) = assignment.color() {
            pool.insert(color);
        }
    }

    reorder_to_palette(&pool)
}
