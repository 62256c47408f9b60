//! Save/restore tests for stateless server deployments.

use srp6a::groups::G_2048;
use srp6a::{compute_verifier, new_random_salt, Client, Server, SrpError};

const USERNAME: &str = "alice@example.com";
const PASSWORD: &str = "some-password";

#[test]
fn restore_mid_session_accepts_the_same_proof() {
    let salt = new_random_salt();
    let user = compute_verifier(&G_2048, USERNAME, PASSWORD, &salt).unwrap();

    let mut client = Client::new(&G_2048, USERNAME, PASSWORD, &salt).unwrap();
    let mut server =
        Server::new(&G_2048, user.username(), user.salt(), user.verifier()).unwrap();

    // Save after the key exchange, before the proof round trip.
    server.set_a(&client.a_pub()).unwrap();
    client.set_b(&server.b_pub()).unwrap();
    let saved = server.save().unwrap();

    // The restored instance carries the same state...
    let mut restored = Server::restore(&saved).unwrap();
    assert_eq!(restored.b_pub(), server.b_pub());
    assert_eq!(restored.save().unwrap(), saved);

    // ...and accepts the proof the original would have accepted.
    let m1 = client.compute_m1().unwrap();
    assert!(restored.check_m1(&m1).unwrap());
    assert!(client.check_m2(&restored.compute_m2().unwrap()).unwrap());
    assert_eq!(
        client.session_key().unwrap(),
        restored.session_key().unwrap()
    );
}

#[test]
fn restore_before_the_key_exchange() {
    let salt = new_random_salt();
    let user = compute_verifier(&G_2048, USERNAME, PASSWORD, &salt).unwrap();

    let server =
        Server::new(&G_2048, user.username(), user.salt(), user.verifier()).unwrap();
    let saved = server.save().unwrap();

    let blob: serde_json::Value = serde_json::from_slice(&saved).unwrap();
    assert_eq!(blob["group"], "2048");
    assert_eq!(blob["verifiedM1"], false);
    assert!(blob.get("A").is_none(), "A must be omitted until set");

    // A full handshake still works from the restored session.
    let mut restored = Server::restore(&saved).unwrap();
    let mut client = Client::new(&G_2048, USERNAME, PASSWORD, &salt).unwrap();
    restored.set_a(&client.a_pub()).unwrap();
    client.set_b(&restored.b_pub()).unwrap();
    assert!(restored.check_m1(&client.compute_m1().unwrap()).unwrap());
    assert_eq!(
        client.session_key().unwrap(),
        restored.session_key().unwrap()
    );
}

#[test]
fn restore_preserves_the_verified_flag() {
    let salt = new_random_salt();
    let user = compute_verifier(&G_2048, USERNAME, PASSWORD, &salt).unwrap();

    let mut client = Client::new(&G_2048, USERNAME, PASSWORD, &salt).unwrap();
    let mut server =
        Server::new(&G_2048, user.username(), user.salt(), user.verifier()).unwrap();
    server.set_a(&client.a_pub()).unwrap();
    client.set_b(&server.b_pub()).unwrap();
    assert!(server.check_m1(&client.compute_m1().unwrap()).unwrap());

    let saved = server.save().unwrap();
    let blob: serde_json::Value = serde_json::from_slice(&saved).unwrap();
    assert_eq!(blob["verifiedM1"], true);

    // The restored session is already proven: M2 and the key are at hand.
    let restored = Server::restore(&saved).unwrap();
    assert_eq!(restored.compute_m2().unwrap(), server.compute_m2().unwrap());
    assert_eq!(
        restored.session_key().unwrap(),
        server.session_key().unwrap()
    );
}

#[test]
fn restore_requires_a_registered_group() {
    let salt = new_random_salt();
    let user = compute_verifier(&G_2048, USERNAME, PASSWORD, &salt).unwrap();
    let server =
        Server::new(&G_2048, user.username(), user.salt(), user.verifier()).unwrap();

    let mut blob: serde_json::Value =
        serde_json::from_slice(&server.save().unwrap()).unwrap();
    blob["group"] = serde_json::Value::String("never-registered".into());
    let tampered = serde_json::to_vec(&blob).unwrap();

    assert_eq!(
        Server::restore(&tampered).err(),
        Some(SrpError::UnregisteredGroup {
            name: "never-registered".into()
        })
    );
}

#[test]
fn restore_rejects_garbage() {
    assert!(matches!(
        Server::restore(b"not json at all").err(),
        Some(SrpError::Internal(_))
    ));
}

#[test]
fn a_latched_session_refuses_to_save() {
    let salt = new_random_salt();
    let user = compute_verifier(&G_2048, USERNAME, PASSWORD, &salt).unwrap();

    let mut client = Client::new(&G_2048, USERNAME, "wrong-password", &salt).unwrap();
    let mut server =
        Server::new(&G_2048, user.username(), user.salt(), user.verifier()).unwrap();
    server.set_a(&client.a_pub()).unwrap();
    client.set_b(&server.b_pub()).unwrap();

    let m1 = client.compute_m1().unwrap();
    assert!(server.check_m1(&m1).is_err());
    assert_eq!(
        server.save().err(),
        Some(SrpError::AuthenticationFailed { peer: "client" })
    );
}
