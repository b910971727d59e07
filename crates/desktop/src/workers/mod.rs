pub mod toggle_worker;
