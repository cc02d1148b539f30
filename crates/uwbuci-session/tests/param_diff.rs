use uwbuci_frame::tags::app;
use uwbuci_frame::UciConfigTlv;
use uwbuci_session::{
    device_role, device_type, CccSessionParams, FiraSessionParams, ParamError, SessionParams,
};

#[test]
fn ccc_channel_change_yields_channel_plus_mandatory() {
    let mut params = CccSessionParams::default();
    params.channel_id = 5;

    let tlvs = params.app_config_tlvs();
    assert_eq!(tlvs[0], UciConfigTlv::from_u8(app::CHANNEL_NUMBER, 5));
    let channel_count = tlvs
        .iter()
        .filter(|tlv| tlv.tag == app::CHANNEL_NUMBER)
        .count();
    assert_eq!(channel_count, 1);

    let tags: Vec<u16> = tlvs.iter().map(|tlv| tlv.tag).collect();
    assert_eq!(
        tags,
        vec![
            app::CHANNEL_NUMBER,
            app::DEVICE_TYPE,
            app::NO_OF_CONTROLEE,
            app::SLOT_DURATION,
            app::RANGING_INTERVAL,
            app::DEVICE_ROLE,
            app::TX_POWER_ID,
            app::PREAMBLE_CODE_INDEX,
            app::SFD_ID,
            app::SLOTS_PER_RR,
            app::SECURE_SESSION_KEY,
        ]
    );
    assert_eq!(tlvs, params.app_config_tlvs());
}

#[test]
fn mandatory_values_come_from_the_session() {
    let mut params = CccSessionParams::new(1, device_type::CONTROLEE, device_role::RESPONDER, 3);
    params.set_responder_slot_index(2);
    params.set_tx_power(14).expect("14 dBm is in range");

    let tlvs = params.app_config_tlvs();
    let find = |tag: u16| {
        tlvs.iter()
            .find(|tlv| tlv.tag == tag)
            .map(|tlv| tlv.value.clone())
    };
    assert_eq!(find(app::NO_OF_CONTROLEE), Some(vec![3]));
    assert_eq!(find(app::RESPONDER_SLOT_INDEX), Some(vec![2]));
    assert_eq!(find(app::TX_POWER_ID), Some(vec![0]));
    assert_eq!(find(app::SLOT_DURATION), Some(vec![0x60, 0x09]));
    assert_eq!(find(app::RANGING_INTERVAL), Some(vec![96, 0, 0, 0]));
}

#[test]
fn fira_requires_both_addresses() {
    let params: SessionParams =
        FiraSessionParams::new(9, device_type::CONTROLLER, device_role::INITIATOR, 0x0001).into();
    assert_eq!(
        params.app_config_tlvs().unwrap_err(),
        ParamError::MissingRequired {
            name: "dst_mac_addr",
            tag: app::DST_MAC_ADDRESS,
        }
    );
}

#[test]
fn fira_controller_with_two_controlees() {
    let mut fira = FiraSessionParams::new(9, device_type::CONTROLLER, device_role::INITIATOR, 0x0001);
    fira.set_dst_addresses(vec![0x0002, 0x0003]);
    fira.anchor_num = 2;
    let params = SessionParams::from(fira);

    assert!(params.is_controller());
    let tlvs = params.app_config_tlvs().expect("addresses are set");
    let tags: Vec<u16> = tlvs.iter().map(|tlv| tlv.tag).collect();
    assert_eq!(
        &tags[..3],
        &[
            app::NO_OF_CONTROLEE,
            app::DEVICE_MAC_ADDRESS,
            app::DST_MAC_ADDRESS
        ]
    );
    assert!(!tags.contains(&app::RESPONDER_SLOT_INDEX));
    assert_eq!(tlvs[2].value, vec![0x02, 0x00, 0x03, 0x00]);
}

#[test]
fn params_load_from_partial_json() {
    let params: SessionParams = serde_json::from_str(
        r#"{
            "profile": "fira",
            "session_id": 1,
            "device_type": 0,
            "device_role": 0,
            "device_mac_addr": 2,
            "dst_mac_addr": [1]
        }"#,
    )
    .expect("partial FiRa JSON should parse");

    let SessionParams::Fira(fira) = &params else {
        panic!("expected a FiRa session");
    };
    assert_eq!(fira.dst_mac_addr, vec![1]);
    assert_eq!(fira.slots_per_rr, 25);
    assert!(!params.is_controller());
    params.app_config_tlvs().expect("addresses are set");
}
