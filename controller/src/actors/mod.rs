pub mod coordinator;
pub mod item_registry;
pub mod player_registry;
pub mod receiver;
pub mod sender;
pub mod surface;
pub mod task_sequencer;

pub use coordinator::{ControllerActor, ControllerArguments, ControllerMsg};
pub use item_registry::ItemRegistry;
pub use player_registry::PlayerRegistry;
pub use receiver::MessageReceiver;
pub use sender::MessageSender;
pub use task_sequencer::TaskSequencer;
