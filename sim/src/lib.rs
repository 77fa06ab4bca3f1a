/*!
Client-side real-time simulation core for a voxel social world.

Local-avatar physics, per-room collision resolution, seat/mount state
machines, and remote-avatar interpolation with distance-based quality
scaling. Everything runs single-threaded inside one per-frame tick;
rendering, asset construction, UI, and the network transport are external
collaborators behind the seams in [`net`] and [`room`].
*/

pub mod collision;
pub mod config;
pub mod fault;
pub mod input;
pub mod lod;
pub mod math;
pub mod mount;
pub mod net;
pub mod physics;
pub mod remote;
pub mod resume;
pub mod room;
pub mod seat;
pub mod state;
pub mod tick;

pub use config::SimConfig;
pub use fault::SimFault;
pub use input::{InputIntent, InputSampler};
pub use lod::{LodDecision, LodTier};
pub use math::{Quat, Vec2, Vec3};
pub use mount::{MountSpec, MountState, TrickState};
pub use net::{InboundEvent, SnapshotInbox, Transport};
pub use remote::{RemoteId, RemoteRenderState, RemoteSnapshot};
pub use resume::PersistedLocation;
pub use room::{
    DismountSide, HeightCollider, LandingSurface, PlanarRegion, RoomBounds, RoomGeometry,
    RoomHooks, SeatDescriptor, SeatId,
};
pub use seat::{SeatController, SeatState, SeatTransition};
pub use state::{LocalAvatarState, SimulationState};
pub use tick::{Simulation, TickReport};
