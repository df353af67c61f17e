use oxc::syntax::identifier::is_identifier_part;

pub fn is_validate_identifier_name(name: &str) -> bool {
  oxc::syntax::identifier::is_identifier_name(name)
}

/// Derive a valid identifier from an arbitrary module specifier, e.g.
/// `./helper.cjs` -> `_helper_cjs`. Used for generated `require` bindings.
pub fn legitimize_identifier_name(name: &str) -> String {
  let name = name.trim_start_matches(['.', '/']);
  let mut legitimized = String::with_capacity(name.len() + 1);
  legitimized.push('_');

  for char in name.chars() {
    legitimized.push(if is_identifier_part(char) { char } else { '_' });
  }

  legitimized
}

#[test]
fn test_legitimize_identifier_name() {
  assert_eq!(legitimize_identifier_name("left-pad"), "_left_pad");
  assert_eq!(legitimize_identifier_name("./helper.cjs"), "_helper_cjs");
  assert_eq!(legitimize_identifier_name("@scope/pkg"), "__scope_pkg");
}
