use scaledtime::{
    cast::Casting,
    host::{CalendarLike, DurationLike, Value},
    ingest::Converter,
    Instant, Kind, Metadata, Timedelta, NAT,
};

use crate::Result;

fn meta(s: &str) -> Metadata {
    s.parse().unwrap()
}

fn td(s: &str, value: i64) -> Value<'static> {
    Value::Timedelta(Timedelta::new(meta(s), value))
}

#[test]
fn text_instants() -> Result {
    crate::init();

    let detect = Converter::new();
    let i = detect.instant(Value::from("2011-03-15T10:30:45.250Z"))?;
    assert_eq!(i.metadata(), meta("[ms]"));
    assert_eq!(i.value(), 1_300_185_045_250);
    assert_eq!(i.to_string(), "2011-03-15T10:30:45.250");

    // Offsets are removed before converting.
    let i = detect.instant(Value::from("2011-03-15T10:30+05:30"))?;
    assert_eq!(i.metadata(), meta("[m]"));
    assert_eq!(i.value(), 21_669_420);

    let hours = Converter::new().metadata(Some(meta("[h]")));
    let i = hours.instant(Value::from("2011-03-15T10:30"))?;
    assert_eq!(i.value(), 361_162);

    let err = hours
        .casting(Casting::Safe)
        .instant(Value::from("2011-03-15T10:30"))
        .unwrap_err();
    assert!(err.is_casting(), "{err}");

    assert!(detect.instant(Value::from("  nat "))?.is_nat());
    assert!(detect.instant(Value::from(""))?.is_nat());
    Ok(())
}

#[test]
fn calendar_instants() -> Result {
    crate::init();

    let detect = Converter::new();
    let i = detect.instant(Value::Calendar(CalendarLike::date(2011, 3, 15)))?;
    assert_eq!(i, Instant::new(meta("[D]"), 15_048));

    let err = detect
        .instant(Value::Calendar(CalendarLike::date(2011, 2, 29)))
        .unwrap_err();
    assert!(err.is_value(), "{err}");

    let cal = CalendarLike::date(2011, 3, 15).at(25, 0, 0, 0);
    assert!(detect.instant(Value::Calendar(cal)).unwrap_err().is_value());
    Ok(())
}

#[test]
fn duration_timedeltas() -> Result {
    crate::init();

    let day = DurationLike { days: 1, seconds: 0, microseconds: 0 };
    let td = Converter::new().timedelta(Value::Duration(day))?;
    assert_eq!(td, Timedelta::new(meta("[us]"), 86_400_000_000));

    let safe = Converter::new().casting(Casting::Safe);
    let td =
        safe.metadata(Some(meta("[h]"))).timedelta(Value::Duration(day))?;
    assert_eq!(td.value(), 24);

    // A day isn't a whole number of weeks.
    let err = safe
        .metadata(Some(meta("[W]")))
        .timedelta(Value::Duration(day))
        .unwrap_err();
    assert!(err.is_casting(), "{err}");
    Ok(())
}

#[test]
fn text_timedeltas() -> Result {
    crate::init();

    let td = Converter::new()
        .metadata(Some(meta("[15m]")))
        .timedelta(Value::from(" 7"))?;
    assert_eq!(td.to_string(), "7[15m]");

    let err = Converter::new().timedelta(Value::from("bogus")).unwrap_err();
    assert!(err.is_parse(), "{err}");

    let unsafe_ = Converter::new().casting(Casting::Unsafe);
    assert!(unsafe_.timedelta(Value::from("bogus"))?.is_nat());
    Ok(())
}

#[test]
fn unified_values() -> Result {
    crate::init();

    // Instants in months combine with durations in days.
    let (m, ticks) = Converter::new().values(&[
        (Kind::Datetime, Value::from("2011-03")),
        (Kind::Timedelta, td("[D]", 5)),
    ])?;
    assert_eq!(m, meta("[D]"));
    assert_eq!(ticks, [15_034, 5]);

    // But durations in months don't.
    let err = Converter::new()
        .values(&[
            (Kind::Timedelta, td("[M]", 1)),
            (Kind::Timedelta, td("[D]", 5)),
        ])
        .unwrap_err();
    assert!(err.is_casting(), "{err}");

    let (m, ticks) = Converter::new()
        .metadata(Some(meta("[s]")))
        .values(&[
            (Kind::Datetime, Value::Missing),
            (Kind::Timedelta, Value::Integer(90)),
        ])?;
    assert_eq!(m, meta("[s]"));
    assert_eq!(ticks, [NAT, 90]);
    Ok(())
}
