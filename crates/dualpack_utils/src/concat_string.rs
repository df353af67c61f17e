/// Concatenate string-ish expressions into one `String` with a single
/// up-front allocation.
#[macro_export]
macro_rules! concat_string {
  ($($value:expr),+ $(,)?) => {{
    let mut out = String::with_capacity(0 $(+ AsRef::<str>::as_ref(&$value).len())+);
    $(out.push_str($value.as_ref());)+
    out
  }};
}

#[test]
fn test_concat_string() {
  assert_eq!(concat_string!("a", "b", "c"), "abc");
  let owned = String::from("mid");
  assert_eq!(concat_string!("pre/", owned, ".js"), "pre/mid.js");
}
