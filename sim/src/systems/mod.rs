//! ECS Systems for the Bastion Lanes simulation.
//!
//! Systems contain the game logic that operates on components.
//!
//! ## Tick Order
//!
//! One tick runs these systems in a single chain on one thread:
//!
//! 1. `death_sweep_system` - Despawns dead units, banks their rewards
//! 2. `reward_payout_system` - Pays banked rewards into the economy
//! 3. `passive_income_system` - Accrues gold for the elapsed frame
//! 4. `spatial_grid_update_system` - Rebuilds the grid if the roster or any cell changed
//! 5. `unit_update_system` - Allies then enemies: attack or move
//! 6. `defeat_check_system` - Ends the encounter if the player base fell
//! 7. `wave_progress_system` - Advances the wave or declares victory
//! 8. `final_defeat_check_system` - Repeats the defeat check

pub mod combat;
pub mod movement;
pub mod serialization;
pub mod sweep;
pub mod units;
pub mod waves;

pub use combat::*;
pub use movement::*;
pub use serialization::*;
pub use sweep::*;
pub use units::*;
pub use waves::*;
