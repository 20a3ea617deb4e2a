//! The declared per-tick role dispatch table.
//!
//! Every tick walks [`DISPATCH_ORDER`] from top to bottom. A descriptor
//! says when its role acts, who the flowchart edge points at, and how the
//! task text is built from the tick's [`EnvironmentReport`].

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use relief_types::{AgentRole, Coordinate, EnvironmentReport, SupplyNeed};
use relief_world::random_cell;

/// Flowchart target for the controller's broadcast.
pub const BROADCAST_TARGET: &str = "All";

/// Flowchart target for every report sent back to the controller.
pub const CONTROLLER_TARGET: &str = "Controller";

/// When a role takes its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// Every tick.
    Always,
    /// Only while victims are outstanding.
    VictimsPresent,
    /// Only while supply needs are outstanding.
    NeedsPresent,
}

impl Precondition {
    /// Whether the precondition holds for this tick's report.
    pub fn holds(self, report: &EnvironmentReport) -> bool {
        match self {
            Self::Always => true,
            Self::VictimsPresent => !report.victim_locations.is_empty(),
            Self::NeedsPresent => !report.supply_needs.is_empty(),
        }
    }
}

/// What a successful turn completes in the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Move to the victim and mark them rescued.
    Rescue(Coordinate),
    /// Move to the need and mark it supplied.
    Supply(SupplyNeed),
}

impl Completion {
    /// Where the acting agent moves to.
    pub const fn location(self) -> Coordinate {
        match self {
            Self::Rescue(location) => location,
            Self::Supply(need) => need.location,
        }
    }
}

/// One built task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Text sent to the backend.
    pub task: String,
    /// Flowchart and status-table summary.
    pub summary: String,
    /// Environment effect applied when the agent responds.
    pub completion: Option<Completion>,
}

impl Assignment {
    fn plain(task: String) -> Self {
        Self {
            summary: task.clone(),
            task,
            completion: None,
        }
    }
}

/// Descriptor for one role's turn.
#[derive(Debug, Clone, Copy)]
pub struct RoleDispatch {
    /// The role that acts.
    pub role: AgentRole,
    /// When it acts.
    pub precondition: Precondition,
    /// Flowchart edge target.
    pub target: &'static str,
    /// Task builder.
    pub build: fn(&EnvironmentReport, &mut StdRng) -> Assignment,
}

/// Roles in the order they act each tick.
pub const DISPATCH_ORDER: [RoleDispatch; 7] = [
    RoleDispatch {
        role: AgentRole::Controller,
        precondition: Precondition::Always,
        target: BROADCAST_TARGET,
        build: coordinate,
    },
    RoleDispatch {
        role: AgentRole::Routes,
        precondition: Precondition::Always,
        target: CONTROLLER_TARGET,
        build: clear_routes,
    },
    RoleDispatch {
        role: AgentRole::Drone,
        precondition: Precondition::Always,
        target: CONTROLLER_TARGET,
        build: survey,
    },
    RoleDispatch {
        role: AgentRole::Assessor,
        precondition: Precondition::Always,
        target: CONTROLLER_TARGET,
        build: assess,
    },
    RoleDispatch {
        role: AgentRole::Rescue,
        precondition: Precondition::VictimsPresent,
        target: CONTROLLER_TARGET,
        build: rescue,
    },
    RoleDispatch {
        role: AgentRole::Supplies,
        precondition: Precondition::NeedsPresent,
        target: CONTROLLER_TARGET,
        build: deliver,
    },
    RoleDispatch {
        role: AgentRole::Medical,
        precondition: Precondition::VictimsPresent,
        target: CONTROLLER_TARGET,
        build: treat,
    },
];

/// Render cells as a bracketed list, e.g. `[(1, 2), (3, 4)]`.
pub fn format_cells<T: core::fmt::Display>(cells: &[T]) -> String {
    let inner: Vec<String> = cells.iter().map(ToString::to_string).collect();
    format!("[{}]", inner.join(", "))
}

// ---------------------------------------------------------------------------
// Task builders
// ---------------------------------------------------------------------------

fn coordinate(report: &EnvironmentReport, _rng: &mut StdRng) -> Assignment {
    Assignment {
        task: format!(
            "Coordinate for {}. Areas: {}",
            report.disaster_type,
            format_cells(&report.affected_areas)
        ),
        summary: String::from("Coordinate response"),
        completion: None,
    }
}

fn clear_routes(report: &EnvironmentReport, _rng: &mut StdRng) -> Assignment {
    Assignment::plain(format!("Clear routes: {}", format_cells(&report.blocked_routes)))
}

fn survey(report: &EnvironmentReport, rng: &mut StdRng) -> Assignment {
    let area = report
        .affected_areas
        .choose(rng)
        .copied()
        .unwrap_or_else(|| random_cell(rng));
    Assignment::plain(format!("Survey {area}"))
}

fn assess(report: &EnvironmentReport, rng: &mut StdRng) -> Assignment {
    let area = report
        .affected_areas
        .choose(rng)
        .copied()
        .unwrap_or(Coordinate::ORIGIN);
    Assignment::plain(format!("Assess {area}"))
}

fn victim_task(verb: &str, report: &EnvironmentReport, rng: &mut StdRng) -> Assignment {
    // Callers only run under `VictimsPresent`; the fallback keeps the builder total.
    let victim = report
        .victim_locations
        .choose(rng)
        .copied()
        .unwrap_or(Coordinate::ORIGIN);
    Assignment {
        completion: Some(Completion::Rescue(victim)),
        ..Assignment::plain(format!("{verb} at {victim}"))
    }
}

fn rescue(report: &EnvironmentReport, rng: &mut StdRng) -> Assignment {
    victim_task("Rescue", report, rng)
}

fn treat(report: &EnvironmentReport, rng: &mut StdRng) -> Assignment {
    victim_task("Treat", report, rng)
}

fn deliver(report: &EnvironmentReport, rng: &mut StdRng) -> Assignment {
    match report.supply_needs.choose(rng).copied() {
        Some(need) => Assignment {
            completion: Some(Completion::Supply(need)),
            ..Assignment::plain(format!("Deliver to {need}"))
        },
        None => Assignment::plain(String::from("Deliver to []")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use relief_types::{DisasterType, SupplyKind};

    use super::*;

    fn cell(x: u8, y: u8) -> Coordinate {
        Coordinate::new(x, y).unwrap()
    }

    fn report() -> EnvironmentReport {
        EnvironmentReport {
            disaster_type: DisasterType::Flood,
            affected_areas: vec![cell(1, 2), cell(3, 4)],
            blocked_routes: vec![cell(5, 6)],
            victim_locations: vec![cell(7, 8)],
            supply_needs: vec![SupplyNeed {
                location: cell(9, 10),
                kind: SupplyKind::Water,
            }],
        }
    }

    fn empty() -> EnvironmentReport {
        EnvironmentReport {
            affected_areas: Vec::new(),
            blocked_routes: Vec::new(),
            victim_locations: Vec::new(),
            supply_needs: Vec::new(),
            ..report()
        }
    }

    fn build(role: AgentRole, report: &EnvironmentReport) -> Assignment {
        let mut rng = StdRng::seed_from_u64(9);
        let entry = DISPATCH_ORDER.iter().find(|d| d.role == role).unwrap();
        (entry.build)(report, &mut rng)
    }

    #[test]
    fn order_is_controller_first_medical_last() {
        let roles: Vec<AgentRole> = DISPATCH_ORDER.iter().map(|d| d.role).collect();
        assert_eq!(
            roles,
            vec![
                AgentRole::Controller,
                AgentRole::Routes,
                AgentRole::Drone,
                AgentRole::Assessor,
                AgentRole::Rescue,
                AgentRole::Supplies,
                AgentRole::Medical,
            ]
        );
        assert_eq!(DISPATCH_ORDER.first().unwrap().target, "All");
        assert!(DISPATCH_ORDER.iter().skip(1).all(|d| d.target == "Controller"));
    }

    #[test]
    fn lists_render_as_bracketed_tuples() {
        assert_eq!(format_cells(&[cell(1, 2), cell(3, 4)]), "[(1, 2), (3, 4)]");
        assert_eq!(format_cells::<Coordinate>(&[]), "[]");
    }

    #[test]
    fn task_texts() {
        let report = report();
        let controller = build(AgentRole::Controller, &report);
        assert_eq!(controller.task, "Coordinate for flood. Areas: [(1, 2), (3, 4)]");
        assert_eq!(controller.summary, "Coordinate response");

        assert_eq!(build(AgentRole::Routes, &report).task, "Clear routes: [(5, 6)]");

        let rescue = build(AgentRole::Rescue, &report);
        assert_eq!(rescue.task, "Rescue at (7, 8)");
        assert_eq!(rescue.summary, rescue.task);
        assert_eq!(rescue.completion, Some(Completion::Rescue(cell(7, 8))));

        assert_eq!(build(AgentRole::Medical, &report).task, "Treat at (7, 8)");

        let deliver = build(AgentRole::Supplies, &report);
        assert_eq!(deliver.task, "Deliver to (9, 10, water)");
        assert_eq!(deliver.completion.unwrap().location(), cell(9, 10));

        let survey = build(AgentRole::Drone, &report).task;
        assert!(survey == "Survey (1, 2)" || survey == "Survey (3, 4)");
    }

    #[test]
    fn empty_report_falls_back() {
        let report = empty();
        assert_eq!(build(AgentRole::Assessor, &report).task, "Assess (0, 0)");
        assert!(build(AgentRole::Drone, &report).task.starts_with("Survey ("));
        assert_eq!(build(AgentRole::Routes, &report).task, "Clear routes: []");
    }

    #[test]
    fn preconditions_follow_outstanding_lists() {
        let full = report();
        let none = empty();
        assert!(Precondition::Always.holds(&none));
        assert!(Precondition::VictimsPresent.holds(&full));
        assert!(!Precondition::VictimsPresent.holds(&none));
        assert!(Precondition::NeedsPresent.holds(&full));
        assert!(!Precondition::NeedsPresent.holds(&none));
    }
}
