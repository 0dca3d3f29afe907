pub mod event_id;
