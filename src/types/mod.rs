pub mod calendar;
pub mod compass_point;
pub mod daily_record;
pub mod dataset;
pub mod fetch_window;
pub mod period;
