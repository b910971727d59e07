pub mod events;
pub mod frame_scheduler;
pub mod render_loop;
pub mod render_stats;
pub mod session;
pub mod session_state;
