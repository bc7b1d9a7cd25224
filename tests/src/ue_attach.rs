//! UE attach integration tests
//!
//! Tests S1 mode, network selection, attach, detach, lower-layer events and
//! cleanup of the UE NAS procedure layer over the loopback layers.

use integration_tests::{drain_indications, init_test_logging, TestUeConfig};
use nextgsim_common::Plmn;
use nextgsim_ue::{
    AccessTechnology, CellInfo, EmmPrimitive, Indication, LoopbackOperator, MobilityLayer,
    OperatorId, PlmnFormat, PlmnSelectionMode, ProcError, RegistrationStatus, SessionLayer,
    SignalQuality,
};

/// Test indications arrive in the order of the underlying events
#[tokio::test]
async fn test_attach_detach_indication_order() {
    init_test_logging();

    let (mut ue, mut rx) = TestUeConfig::default().build().unwrap();
    ue.enable_s1_mode().unwrap();
    ue.attach().unwrap();
    ue.detach(false).unwrap();

    let mut seen = Vec::new();
    while let Ok(indication) = rx.try_recv() {
        seen.push(indication);
    }
    assert_eq!(seen.len(), 6);
    assert!(matches!(
        seen[0],
        Indication::Registration {
            status: RegistrationStatus::RegisteredHome,
            ..
        }
    ));
    assert_eq!(seen[1], Indication::PdnState { cid: 1, active: true });
    assert_eq!(
        seen[2],
        Indication::Attach {
            attached: true,
            is_emergency: false
        }
    );
    assert!(matches!(
        seen[3],
        Indication::Registration {
            status: RegistrationStatus::NotRegistered,
            ..
        }
    ));
    assert_eq!(seen[4], Indication::PdnState { cid: 1, active: false });
    assert_eq!(
        seen[5],
        Indication::Attach {
            attached: false,
            is_emergency: false
        }
    );
}

/// Test indications can be consumed from another task
#[tokio::test]
async fn test_indications_across_tasks() {
    init_test_logging();

    let (mut ue, mut rx) = TestUeConfig::default().build().unwrap();
    let consumer = tokio::spawn(async move {
        let mut attach_events = 0;
        while let Some(indication) = rx.recv().await {
            if matches!(indication, Indication::Attach { .. }) {
                attach_events += 1;
            }
        }
        attach_events
    });

    ue.attach().unwrap();
    ue.detach(true).unwrap();
    // Dropping the layers closes the channel
    drop(ue.cleanup());

    assert_eq!(consumer.await.unwrap(), 2);
}

/// Test manual network selection towards a visited PLMN
#[test]
fn test_manual_registration_roaming() {
    init_test_logging();

    let (mut ue, mut rx) = TestUeConfig::default().build().unwrap();
    let visited = Plmn::new(208, 93, false);
    ue.emm_mut().add_operator(LoopbackOperator::eutran(visited));

    ue.register(
        PlmnSelectionMode::Manual,
        PlmnFormat::Numeric,
        Some(&OperatorId::Numeric(visited)),
        Some(AccessTechnology::Eutran),
    )
    .unwrap();

    assert_eq!(ue.registration_status(), RegistrationStatus::RegisteredRoaming);
    let data = ue.registration_data(PlmnFormat::Numeric);
    assert_eq!(data.mode, PlmnSelectionMode::Manual);
    assert_eq!(data.operator.as_deref(), Some("20893"));
    assert_eq!(data.rat, Some(AccessTechnology::Eutran));
    assert_eq!(ue.emm().sent(), &[EmmPrimitive::RegisterReq { index: 1 }]);
    assert_eq!(drain_indications(&mut rx).len(), 1);
}

/// Test failed network selection sends nothing
#[test]
fn test_registration_failure() {
    init_test_logging();

    let (mut ue, _rx) = TestUeConfig::default().build().unwrap();
    let result = ue.register(
        PlmnSelectionMode::Manual,
        PlmnFormat::LongAlpha,
        Some(&OperatorId::LongName("Nowhere".into())),
        None,
    );
    assert_eq!(result, Err(ProcError::PlmnSelection));
    assert!(ue.emm().sent().is_empty());
    assert!(!ue.registration_data(PlmnFormat::LongAlpha).is_selected());
}

/// Test detaching while detached is accepted
#[test]
fn test_redundant_detach() {
    init_test_logging();

    let (mut ue, mut rx) = TestUeConfig::default().build().unwrap();
    assert!(ue.detach(false).is_ok());
    assert!(ue.detach(true).is_ok());
    assert!(!ue.attach_status());
    assert!(drain_indications(&mut rx).is_empty());
}

/// Test cell information updates location and signal quality
#[test]
fn test_cell_info_and_location() {
    init_test_logging();

    let (mut ue, _rx) = TestUeConfig::default().build().unwrap();
    assert_eq!(ue.signal_quality(), SignalQuality { rsrq: 255, rsrp: 255 });

    ue.cell_info(CellInfo {
        found: true,
        tac: 0xBEEF,
        cell_id: 0x0123_4567,
        rat: AccessTechnology::Eutran,
        rsrq: 17,
        rsrp: 61,
    })
    .unwrap();
    ue.attach().unwrap();

    let loc = ue.location_info();
    assert_eq!(loc.tac, "beef");
    assert_eq!(loc.ci, "01234567");
    assert_eq!(loc.rat, Some(AccessTechnology::Eutran));
    assert_eq!(ue.signal_quality(), SignalQuality { rsrq: 17, rsrp: 61 });
}

/// Test subscriber identity queries
#[test]
fn test_identity_queries() {
    init_test_logging();

    let (ue, _rx) = TestUeConfig::default().build().unwrap();
    assert_eq!(ue.imsi().as_deref(), Some("001010000000001"));
    assert_eq!(ue.msisdn(), Some(("33611223344".to_string(), 0x91)));
    assert!(!ue.eps_capability());

    let (ue, _rx) = TestUeConfig::default()
        .with_imsi("20893000000001")
        .build()
        .unwrap();
    assert_eq!(ue.imsi().as_deref(), Some("20893000000001"));
}

/// Test downlink transfer with an empty message
#[test]
fn test_empty_downlink_rejected() {
    init_test_logging();

    let (mut ue, _rx) = TestUeConfig::default().build().unwrap();
    assert_eq!(ue.dl_transfer_ind(&[]), Err(ProcError::EmptyDownlink));
    assert!(ue.emm().sent().is_empty());
}

/// Test connection events are forwarded unchanged
#[test]
fn test_connection_events_forwarded() {
    init_test_logging();

    let (mut ue, _rx) = TestUeConfig::default().build().unwrap();
    let nas = [0x07, 0x42, 0x01, 0x02];
    ue.establish_cnf(&nas).unwrap();
    ue.ul_transfer_cnf().unwrap();
    ue.dl_transfer_ind(&nas[..2]).unwrap();
    ue.release_ind(1).unwrap();

    let names: Vec<&str> = ue.emm().sent().iter().map(EmmPrimitive::name).collect();
    assert_eq!(
        names,
        vec![
            "EMMAS-ESTABLISH-CNF",
            "EMMAS-DATA-IND",
            "EMMAS-DATA-IND",
            "EMMAS-RELEASE-IND"
        ]
    );
    match &ue.emm().sent()[2] {
        EmmPrimitive::DataInd {
            ue_id, nas_msg, ..
        } => {
            assert_eq!(*ue_id, 1);
            assert_eq!(&nas_msg[..], &nas[..2]);
        }
        other => panic!("unexpected primitive {other:?}"),
    }
}

/// Test cleanup performs a switch-off detach
#[test]
fn test_cleanup_switch_off() {
    init_test_logging();

    let (mut ue, mut rx) = TestUeConfig::default().build().unwrap();
    ue.attach().unwrap();
    assert_eq!(ue.esm().active_pdn_count(), 1);
    drain_indications(&mut rx);

    let (emm, esm) = ue.cleanup();
    assert_eq!(
        emm.sent().last(),
        Some(&EmmPrimitive::DetachInit { switch_off: true })
    );
    assert!(!emm.is_attached());
    assert!(!esm.is_initialized());
    assert_eq!(esm.active_pdn_count(), 0);
    assert_eq!(esm.pdn(1), None);
    assert!(drain_indications(&mut rx)
        .iter()
        .any(|i| matches!(i, Indication::Attach { attached: false, .. })));
}
