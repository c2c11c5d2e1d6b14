use time::{Date, Month, UtcDateTime, error::ComponentRange};

/// Subtract whole calendar months, keeping the time of day.
/// Days past the end of the target month are clamped (Aug 31 minus 6 months is Feb 28/29).
pub fn sub_months(value: UtcDateTime, months: u32) -> Result<UtcDateTime, ComponentRange> {
    let date = value.date();
    let index =
        i64::from(date.year()) * 12 + i64::from(u8::from(date.month())) - 1 - i64::from(months);
    let year = index.div_euclid(12) as i32;
    let month = Month::try_from(index.rem_euclid(12) as u8 + 1)?;
    let mut day = date.day();
    let date = loop {
        match Date::from_calendar_date(year, month, day) {
            Ok(date) => break date,
            Err(_) if day > 28 => day -= 1,
            Err(e) => return Err(e),
        }
    };
    Ok(UtcDateTime::new(date, value.time()))
}
