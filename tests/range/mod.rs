use scaledtime::{
    host::{CalendarLike, DurationLike, Value},
    range::arange,
    Instant, TemporalType,
};

use crate::Result;

fn ty(s: &str) -> TemporalType {
    s.parse().unwrap()
}

#[test]
fn days_in_a_month() -> Result {
    crate::init();

    let r = arange(
        Some(Value::from("2011-02-26")),
        Some(Value::from("2011-03-03")),
        None,
        Some(ty("M8")),
    )?;
    assert_eq!(r.ty(), ty("M8[D]"));
    let days: Vec<String> = r
        .values()
        .iter()
        .map(|&v| Instant::new(r.ty().meta(), v).to_string())
        .collect();
    assert_eq!(
        days,
        ["2011-02-26", "2011-02-27", "2011-02-28", "2011-03-01", "2011-03-02"],
    );
    Ok(())
}

#[test]
fn hours_from_a_calendar_start() -> Result {
    crate::init();

    let start = CalendarLike::date(2011, 3, 15).at(22, 0, 0, 0).offset(-60);
    let day = DurationLike { days: 1, ..DurationLike::default() };
    let six_hours =
        DurationLike { days: 0, seconds: 6 * 3_600, microseconds: 0 };
    let r = arange(
        Some(Value::Calendar(start)),
        Some(Value::Duration(day)),
        Some(Value::Duration(six_hours)),
        Some(ty("M8[h]")),
    )?;
    assert_eq!(r.ty(), ty("M8[h]"));
    let hours: Vec<String> = r
        .values()
        .iter()
        .map(|&v| Instant::new(r.ty().meta(), v).to_string())
        .collect();
    assert_eq!(
        hours,
        ["2011-03-15T23", "2011-03-16T05", "2011-03-16T11", "2011-03-16T17"],
    );
    Ok(())
}

#[test]
fn errors_are_categorized() {
    crate::init();

    let err = arange(None, None, None, None).unwrap_err();
    assert!(err.is_value());

    // Far too many values to allocate.
    let err = arange(Some(Value::Integer(i64::MAX)), None, None, None)
        .unwrap_err();
    assert!(err.is_value());
}

/// Builds ranges from comma separated `start,stop,step_seconds` rows, where
/// the step is read by the standard library and everything else by this
/// crate.
#[test]
fn ranges_from_rows() -> anyhow::Result<()> {
    use anyhow::Context;

    crate::init();

    let rows = "\
2011-03-15T10:00,2011-03-15T10:01,20
2011-03-15T10:00,2011-03-15T09:59,-30
";
    let mut lengths = vec![];
    for (i, row) in rows.lines().enumerate() {
        let fields: Vec<&str> = row.split(',').collect();
        let [start, stop, step] = fields[..] else {
            anyhow::bail!("row {i} does not have three fields");
        };
        let seconds: i64 = step
            .parse()
            .with_context(|| format!("row {i} has an invalid step"))?;
        let step = DurationLike { days: 0, seconds, microseconds: 0 };
        let r = arange(
            Some(Value::from(start)),
            Some(Value::from(stop)),
            Some(Value::Duration(step)),
            Some(ty("M8[s]")),
        )
        .with_context(|| format!("row {i} is not a valid range"))?;
        lengths.push(r.len());
    }
    assert_eq!(lengths, [3, 2]);
    Ok(())
}
