pub mod hooks;
pub mod sortable_list;
pub mod ui;
