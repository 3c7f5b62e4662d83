use super::{Allow, AuthController, Disallow};

#[test]
fn test_allow_grants_everything() {
    let auth = Allow;
    assert!(auth.authenticate(b"user", b"pass"));
    assert!(auth.authenticate(b"", b""));
    assert!(auth.acl(b"user", "a/b/c", true));
    assert!(auth.acl(b"user", "#", false));
}

#[test]
fn test_disallow_refuses_everything() {
    let auth = Disallow;
    assert!(!auth.authenticate(b"user", b"pass"));
    assert!(!auth.acl(b"user", "a/b/c", true));
    assert!(!auth.acl(b"user", "a/b/c", false));
}

#[test]
fn test_controllers_as_trait_objects() {
    let controllers: Vec<Box<dyn AuthController>> = vec![Box::new(Allow), Box::new(Disallow)];
    let decisions: Vec<_> = controllers
        .iter()
        .map(|c| c.acl(b"u", "t", true))
        .collect();
    assert_eq!(decisions, vec![true, false]);
}
