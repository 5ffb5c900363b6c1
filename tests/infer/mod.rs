use scaledtime::{
    host::{DurationLike, TextArray, Value},
    ingest::infer_type,
    Instant, Kind, TemporalType, Timedelta,
};

use crate::Result;

fn ty(s: &str) -> TemporalType {
    s.parse().unwrap()
}

fn instants(
    value: Value<'_>,
) -> std::result::Result<TemporalType, scaledtime::Error> {
    infer_type(value, Kind::Datetime)
}

#[test]
fn instants_from_mixed_values() -> Result {
    crate::init();

    let items =
        [Value::from("2011-03-15"), Value::from("2011-03-15T10:30:45.5")];
    assert_eq!(instants(Value::Sequence(&items))?, ty("M8[ms]"));

    let text = TextArray::new(b"2011-03\0\0\02011-03-15", 10);
    assert_eq!(instants(Value::TextArray(text))?, ty("M8[D]"));

    let bad = TextArray::new(b"2011-03\0\0\0yesterday\0", 10);
    assert!(instants(Value::TextArray(bad)).is_err());

    let record = [
        Value::from("2011"),
        Value::Instant(Instant::new("[h]".parse()?, 0)),
    ];
    assert_eq!(instants(Value::Record(&record))?, ty("M8[h]"));

    assert_eq!(instants(Value::Integer(5))?, ty("M8"));
    Ok(())
}

#[test]
fn timedeltas_from_mixed_values() -> Result {
    crate::init();

    let dur = DurationLike { days: 0, seconds: 1, microseconds: 0 };
    let items = vec![
        Value::Duration(dur),
        Value::Timedelta(Timedelta::new("[5ms]".parse()?, 1)),
        Value::Integer(3),
        Value::from("10"),
    ];
    let got = infer_type(Value::Sequence(&items), Kind::Timedelta)?;
    assert_eq!(got, ty("m8[us]"));

    let items = [
        Value::Timedelta(Timedelta::new("[M]".parse()?, 1)),
        Value::Timedelta(Timedelta::new("[D]".parse()?, 1)),
    ];
    let err =
        infer_type(Value::Sequence(&items), Kind::Timedelta).unwrap_err();
    assert!(err.is_casting(), "{err}");
    Ok(())
}
