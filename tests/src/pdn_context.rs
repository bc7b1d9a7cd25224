//! PDN context integration tests
//!
//! Tests definition, activation and deactivation of PDN contexts through the
//! UE NAS procedure layer.

use integration_tests::{drain_indications, init_test_logging, TestSession, TestUe, TestUeConfig};
use nextgsim_common::PdnType;
use nextgsim_ue::{
    EmmPrimitive, EsmPrimitive, Indication, PdnContext, PdnSelection, PdnStatusEntry, ProcError,
    SessionLayer,
};

fn emergency_active_count(ue: &TestUe) -> usize {
    (1..=ue.pdn_range())
        .filter_map(|cid| ue.esm().pdn(cid))
        .filter(|pdn| pdn.is_emergency && pdn.is_active)
        .count()
}

/// Test activation from a detached UE attaches first
#[test]
fn test_activate_when_detached_attaches_first() {
    init_test_logging();

    let (mut ue, _rx) = TestUeConfig::default()
        .with_session(TestSession::ipv4(3, "ims"))
        .build()
        .unwrap();
    assert!(!ue.attach_status());

    ue.activate_pdn(PdnSelection::Cid(3)).unwrap();

    assert_eq!(
        ue.emm().sent(),
        &[EmmPrimitive::AttachInit { is_emergency: false }]
    );
    assert_eq!(
        ue.esm().sent().last(),
        Some(&EsmPrimitive::PdnConnectivityReq {
            cid: 3,
            is_defined: true,
            pdn_type: PdnType::Ipv4,
            apn: Some("ims".to_string()),
            is_emergency: false,
        })
    );
}

/// Test activating every context skips undefined slots
#[test]
fn test_activate_all_skips_undefined() {
    init_test_logging();

    let (mut ue, _rx) = TestUeConfig::default()
        .with_session(TestSession::ipv4(3, "ims"))
        .build()
        .unwrap();
    ue.attach().unwrap();
    ue.esm_mut().clear_sent();

    ue.activate_pdn(PdnSelection::All).unwrap();

    let activated: Vec<u8> = ue.esm().sent().iter().map(EsmPrimitive::cid).collect();
    assert_eq!(activated, vec![3]);
    assert_eq!(
        ue.pdn_status(usize::MAX),
        vec![
            PdnStatusEntry { cid: 1, active: true },
            PdnStatusEntry { cid: 3, active: true },
        ]
    );
}

/// Test a second emergency connection is refused before any primitive
#[test]
fn test_second_emergency_connection_refused() {
    init_test_logging();

    let (mut ue, _rx) = TestUeConfig::default()
        .without_sessions()
        .with_session(TestSession::emergency(1))
        .with_session(TestSession::emergency(4))
        .build()
        .unwrap();
    ue.attach().unwrap();
    ue.activate_pdn(PdnSelection::Cid(1)).unwrap();
    ue.esm_mut().clear_sent();

    assert_eq!(
        ue.activate_pdn(PdnSelection::Cid(4)),
        Err(ProcError::EmergencyAlreadyActive(4))
    );
    assert!(ue.esm().sent().is_empty());
}

/// Test the emergency failure aborts an activation sweep
#[test]
fn test_emergency_failure_aborts_sweep() {
    init_test_logging();

    let (mut ue, _rx) = TestUeConfig::default()
        .without_sessions()
        .with_session(TestSession::emergency(1))
        .with_session(TestSession::emergency(2))
        .with_session(TestSession::ipv4(3, "internet"))
        .build()
        .unwrap();
    ue.attach().unwrap();

    assert_eq!(
        ue.activate_pdn(PdnSelection::All),
        Err(ProcError::EmergencyAlreadyActive(2))
    );
    assert_eq!(ue.esm().pdn_status(1), Some(true));
    assert_eq!(ue.esm().pdn_status(3), Some(false));
}

/// Test no activation order yields two active emergency connections
#[test]
fn test_emergency_exclusivity_over_sequences() {
    init_test_logging();

    let orders: [[PdnSelection; 4]; 3] = [
        [
            PdnSelection::Cid(2),
            PdnSelection::Cid(3),
            PdnSelection::All,
            PdnSelection::Cid(2),
        ],
        [
            PdnSelection::All,
            PdnSelection::Cid(3),
            PdnSelection::Cid(1),
            PdnSelection::All,
        ],
        [
            PdnSelection::Cid(3),
            PdnSelection::Cid(1),
            PdnSelection::Cid(2),
            PdnSelection::All,
        ],
    ];

    for order in orders {
        let (mut ue, _rx) = TestUeConfig::default()
            .with_session(TestSession::emergency(2))
            .with_session(TestSession::emergency(3))
            .build()
            .unwrap();
        for selection in order {
            let _ = ue.activate_pdn(selection);
            assert!(emergency_active_count(&ue) <= 1);
        }
    }
}

/// Test activation is refused while attached for emergency services only
#[test]
fn test_emergency_attach_blocks_activation() {
    init_test_logging();

    let (mut ue, _rx) = TestUeConfig::default().build().unwrap();
    ue.emm_mut().set_attached(true, true);
    assert_eq!(
        ue.activate_pdn(PdnSelection::Cid(1)),
        Err(ProcError::EmergencyAttached)
    );
    assert!(ue.esm().sent().iter().all(|p| !matches!(
        p,
        EsmPrimitive::PdnConnectivityReq {
            is_defined: true,
            ..
        }
    )));
}

/// Test the connection from attach and the last connection are protected
#[test]
fn test_last_connection_protection() {
    init_test_logging();

    let (mut ue, _rx) = TestUeConfig::default()
        .with_session(TestSession::ipv4(2, "ims"))
        .with_session(TestSession::ipv4(3, "mms"))
        .build()
        .unwrap();
    ue.activate_pdn(PdnSelection::All).unwrap();
    assert_eq!(ue.esm().active_pdn_count(), 3);

    assert_eq!(
        ue.deactivate_pdn(PdnSelection::Cid(1)),
        Err(ProcError::DefaultBearerProtected)
    );

    ue.deactivate_pdn(PdnSelection::All).unwrap();
    assert_eq!(ue.esm().active_pdn_count(), 1);
    assert_eq!(ue.esm().pdn_status(1), Some(true));
}

/// Test a sweep keeps the connection established at attach
#[test]
fn test_sweep_keeps_attach_connection() {
    init_test_logging();

    let (mut ue, _rx) = TestUeConfig::default()
        .with_session(TestSession::ipv4(2, "ims"))
        .with_session(TestSession::ipv4(3, "mms"))
        .build()
        .unwrap();
    ue.attach().unwrap();
    ue.activate_pdn(PdnSelection::Cid(2)).unwrap();
    ue.activate_pdn(PdnSelection::Cid(3)).unwrap();
    ue.esm_mut().clear_sent();

    ue.deactivate_pdn(PdnSelection::All).unwrap();
    assert_eq!(ue.esm().active_pdn_count(), 1);
    assert_eq!(ue.esm().pdn_status(1), Some(true));
    assert_eq!(
        ue.esm().sent(),
        &[
            EsmPrimitive::PdnDisconnectReq { cid: 2 },
            EsmPrimitive::PdnDisconnectReq { cid: 3 },
        ]
    );
}

/// Test a sweep never disconnects the only remaining connection when no
/// default context is configured
#[test]
fn test_sweep_stops_at_last_connection() {
    init_test_logging();

    let (mut ue, _rx) = TestUeConfig::default()
        .without_sessions()
        .with_session(TestSession::ipv4(2, "ims"))
        .with_session(TestSession::ipv4(3, "mms"))
        .build()
        .unwrap();
    ue.attach().unwrap();
    assert_eq!(ue.esm().active_pdn_count(), 0);
    ue.activate_pdn(PdnSelection::Cid(2)).unwrap();
    ue.activate_pdn(PdnSelection::Cid(3)).unwrap();
    ue.esm_mut().clear_sent();

    assert_eq!(
        ue.deactivate_pdn(PdnSelection::All),
        Err(ProcError::LastConnection(3))
    );
    assert_eq!(ue.esm().active_pdn_count(), 1);
    assert_eq!(
        ue.esm().sent(),
        &[EsmPrimitive::PdnDisconnectReq { cid: 2 }]
    );
}

/// Test redundant activation and deactivation leave the table unchanged
#[test]
fn test_redundant_actions_are_noops() {
    init_test_logging();

    let (mut ue, mut rx) = TestUeConfig::default()
        .with_session(TestSession::ipv4(2, "ims"))
        .build()
        .unwrap();
    ue.activate_pdn(PdnSelection::Cid(1)).unwrap();
    drain_indications(&mut rx);
    ue.esm_mut().clear_sent();
    let before = ue.pdn_status(usize::MAX);

    ue.activate_pdn(PdnSelection::Cid(1)).unwrap();
    ue.deactivate_pdn(PdnSelection::Cid(2)).unwrap();
    ue.deactivate_pdn(PdnSelection::Cid(4)).unwrap();

    assert_eq!(ue.pdn_status(usize::MAX), before);
    assert!(ue.esm().sent().is_empty());
    assert!(drain_indications(&mut rx).is_empty());
}

/// Test undefined contexts are reported only for single activation
#[test]
fn test_undefined_context() {
    init_test_logging();

    let (mut ue, _rx) = TestUeConfig::default().build().unwrap();
    ue.attach().unwrap();
    assert_eq!(
        ue.activate_pdn(PdnSelection::Cid(2)),
        Err(ProcError::UndefinedContext(2))
    );
    assert!(ue.deactivate_pdn(PdnSelection::Cid(2)).is_ok());
}

/// Test defining, listing and undefining contexts
#[test]
fn test_define_list_reset() {
    init_test_logging();

    let (mut ue, _rx) = TestUeConfig::default()
        .with_max_pdn_contexts(6)
        .build()
        .unwrap();
    ue.define_pdn(4, PdnType::Ipv4v6, Some("corp"), false).unwrap();
    ue.define_pdn(6, PdnType::Ipv6, None, false).unwrap();
    assert_eq!(ue.pdn_range(), 6);

    let params = ue.pdn_parameters(usize::MAX);
    let cids: Vec<u8> = params.iter().map(|p| p.cid).collect();
    assert_eq!(cids, vec![1, 4, 6]);
    assert_eq!(params[1].pdn_type, PdnType::Ipv4v6);
    assert_eq!(params[2].apn, None);

    ue.reset_pdn(4).unwrap();
    assert_eq!(ue.pdn_parameters(usize::MAX).len(), 2);
    assert!(ue.define_pdn(7, PdnType::Ipv4, None, false).is_err());
}

/// Test addresses and state indications of connected contexts
#[test]
fn test_pdn_addresses_and_indications() {
    init_test_logging();

    let (mut ue, mut rx) = TestUeConfig::default()
        .with_session(TestSession {
            cid: 2,
            pdn_type: PdnType::Ipv4v6,
            apn: "ims",
            is_emergency: false,
        })
        .build()
        .unwrap();
    ue.activate_pdn(PdnSelection::All).unwrap();

    let addresses = ue.pdn_addresses(PdnSelection::All, usize::MAX);
    assert_eq!(addresses.len(), 2);
    assert!(addresses[0].address.ipv6.is_none());
    assert!(addresses[1].address.ipv4.is_some());
    assert!(addresses[1].address.ipv6.is_some());
    assert!(ue.pdn_addresses(PdnSelection::Cid(0), usize::MAX).is_empty());

    let states: Vec<Indication> = drain_indications(&mut rx)
        .into_iter()
        .filter(|i| matches!(i, Indication::PdnState { .. }))
        .collect();
    assert_eq!(
        states,
        vec![
            Indication::PdnState { cid: 1, active: true },
            Indication::PdnState { cid: 2, active: true },
        ]
    );
}

/// Test session layer refusals are propagated unchanged
#[test]
fn test_session_layer_refusal_propagated() {
    init_test_logging();

    let (mut ue, _rx) = TestUeConfig::default()
        .with_session(TestSession::ipv4(2, "ims"))
        .build()
        .unwrap();
    ue.attach().unwrap();
    ue.esm_mut().reject_next("insufficient resources");
    assert!(matches!(
        ue.activate_pdn(PdnSelection::Cid(2)),
        Err(ProcError::Sap(_))
    ));
    assert_eq!(
        ue.esm().pdn(2),
        Some(PdnContext::new(PdnType::Ipv4, Some("ims".into()), false))
    );
}

/// Test attach brings up the default connection and detach clears the table
#[test]
fn test_attach_and_detach_drive_pdn_table() {
    init_test_logging();

    let (mut ue, mut rx) = TestUeConfig::default()
        .with_session(TestSession::ipv4(2, "ims"))
        .build()
        .unwrap();
    assert_eq!(ue.esm().pdn_status(1), Some(false));

    ue.attach().unwrap();
    assert_eq!(ue.esm().pdn_status(1), Some(true));
    assert_eq!(ue.esm().pdn_status(2), Some(false));
    assert_eq!(ue.esm().active_pdn_count(), 1);
    assert!(ue.pdn_addresses(PdnSelection::Cid(1), 1)[0].address.ipv4.is_some());

    ue.activate_pdn(PdnSelection::Cid(2)).unwrap();
    assert_eq!(ue.esm().active_pdn_count(), 2);
    drain_indications(&mut rx);

    ue.detach(false).unwrap();
    assert!(!ue.attach_status());
    assert_eq!(ue.esm().active_pdn_count(), 0);
    assert!(ue.pdn_status(usize::MAX).is_empty());
    assert!(ue.pdn_addresses(PdnSelection::All, usize::MAX).is_empty());

    let released: Vec<Indication> = drain_indications(&mut rx)
        .into_iter()
        .filter(|i| matches!(i, Indication::PdnState { .. }))
        .collect();
    assert_eq!(
        released,
        vec![
            Indication::PdnState { cid: 1, active: false },
            Indication::PdnState { cid: 2, active: false },
        ]
    );
}

/// Test contexts must be defined again after a detach
#[test]
fn test_reattach_after_detach_needs_definition() {
    init_test_logging();

    let (mut ue, _rx) = TestUeConfig::default().build().unwrap();
    ue.attach().unwrap();
    ue.detach(true).unwrap();

    ue.attach().unwrap();
    assert_eq!(ue.esm().active_pdn_count(), 0);
    assert_eq!(
        ue.activate_pdn(PdnSelection::Cid(1)),
        Err(ProcError::UndefinedContext(1))
    );

    ue.define_pdn(1, PdnType::Ipv4, Some("internet"), false).unwrap();
    ue.activate_pdn(PdnSelection::Cid(1)).unwrap();
    assert_eq!(ue.esm().pdn_status(1), Some(true));
}
