pub mod financing;
