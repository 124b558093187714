//! Grid placement rules. All occupancy changes go through these helpers so
//! the one-occupant-per-cell invariant holds everywhere.

use crate::shared::*;

impl GardenGrid {
    pub fn cell(&self, id: CellId) -> Result<&Cell, GardenError> {
        self.cells
            .get(id)
            .ok_or_else(|| GardenError::InvalidPlacement(format!("no such cell {id}")))
    }

    pub fn cell_mut(&mut self, id: CellId) -> Result<&mut Cell, GardenError> {
        self.cells
            .get_mut(id)
            .ok_or_else(|| GardenError::InvalidPlacement(format!("no such cell {id}")))
    }

    /// Validates that `id` can receive a new occupant: in bounds, unlocked,
    /// and currently empty.
    pub fn check_placeable(&self, id: CellId) -> Result<(), GardenError> {
        let cell = self.cell(id)?;
        if !cell.unlocked {
            return Err(GardenError::InvalidPlacement(format!(
                "cell {id} is still locked"
            )));
        }
        if cell.occupant != Occupant::Empty {
            return Err(GardenError::InvalidPlacement(format!(
                "cell {id} is occupied"
            )));
        }
        Ok(())
    }

    /// Places an occupant after validation. Placing a building resets the
    /// cell's decay; decay is only meaningful under a building.
    pub fn place(&mut self, id: CellId, occupant: Occupant) -> Result<(), GardenError> {
        if occupant == Occupant::Empty {
            return Err(GardenError::InvariantViolation(
                "place() called with Occupant::Empty".into(),
            ));
        }
        self.check_placeable(id)?;
        let cell = self.cell_mut(id)?;
        cell.occupant = occupant;
        cell.decay = 0.0;
        Ok(())
    }

    /// Empties a cell and clears its decay.
    pub fn clear(&mut self, id: CellId) -> Result<(), GardenError> {
        let cell = self.cell_mut(id)?;
        cell.occupant = Occupant::Empty;
        cell.decay = 0.0;
        Ok(())
    }

    /// First empty, unlocked cell in id order, if any.
    pub fn find_empty_unlocked(&self) -> Option<CellId> {
        self.cells
            .iter()
            .position(|c| c.unlocked && c.occupant == Occupant::Empty)
    }

    /// Where a given occupant currently sits, if anywhere.
    pub fn position_of(&self, occupant: &Occupant) -> Option<CellId> {
        self.cells.iter().position(|c| &c.occupant == occupant)
    }

    /// Opens a locked cell. Unlocking an already-open cell is a no-op.
    pub fn unlock_cell(&mut self, id: CellId) -> Result<(), GardenError> {
        self.cell_mut(id)?.unlocked = true;
        Ok(())
    }

    /// Cell ids currently holding built structures, for the decay pass.
    pub fn building_cells(&self) -> Vec<(CellId, BuildingId)> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(id, c)| match &c.occupant {
                Occupant::Building(b) => Some((id, b.clone())),
                _ => None,
            })
            .collect()
    }
}
