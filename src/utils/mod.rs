pub(crate) mod date;
pub(crate) mod fs;
pub(crate) mod timezone;

pub(crate) use date::{days_in_month, each_day, parse_date, week_start};
pub(crate) use fs::write_atomic;
pub(crate) use timezone::Timezone;
