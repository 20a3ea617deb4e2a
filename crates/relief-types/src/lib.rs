//! Shared type definitions for the Relief simulation.
//!
//! This crate is the single source of truth for all types used across the
//! Relief workspace. Types defined here flow downstream to `TypeScript`
//! via `ts-rs` for the dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper for run identifiers
//! - [`enums`] -- Disaster, supply, role, and status enumerations
//! - [`structs`] -- Grid coordinates, environment report, transcript,
//!   flowchart, and status-table rows
//! - [`events`] -- The [`SimEvent`] stream emitted by the simulation loop

pub mod enums;
pub mod events;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{AgentRole, AgentStatus, DisasterType, SupplyKind};
pub use events::SimEvent;
pub use ids::RunId;
pub use structs::{
    AgentStatusRow, ChatEntry, Coordinate, EnvironmentReport, FlowEdge, GRID_MAX, RunRecord,
    RunSummary, SYSTEM_SENDER, SupplyNeed,
};

#[cfg(test)]
mod tests {
    //! Integration tests for type exports and `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs generates TypeScript bindings when types with
        // #[ts(export)] are used. The files are written to the
        // `bindings/` directory relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::RunId::export_all();

        let _ = crate::enums::DisasterType::export_all();
        let _ = crate::enums::SupplyKind::export_all();
        let _ = crate::enums::AgentRole::export_all();
        let _ = crate::enums::AgentStatus::export_all();

        let _ = crate::structs::Coordinate::export_all();
        let _ = crate::structs::SupplyNeed::export_all();
        let _ = crate::structs::EnvironmentReport::export_all();
        let _ = crate::structs::ChatEntry::export_all();
        let _ = crate::structs::FlowEdge::export_all();
        let _ = crate::structs::AgentStatusRow::export_all();
        let _ = crate::structs::RunSummary::export_all();
        let _ = crate::structs::RunRecord::export_all();

        let _ = crate::events::SimEvent::export_all();
    }
}
