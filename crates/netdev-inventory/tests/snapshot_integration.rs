//! Snapshot device integration tests
//!
//! Polls devices captured as JSON files under `tests/fixtures`, loaded
//! through the device list the way the command line tool does.

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use netdev_inventory::constants::TYPE_LAG;
use netdev_inventory::vendors::iftype::types;
use netdev_inventory::{
    select_capabilities, with_session, AppConfig, BaselineDriver, DeviceList, DevicePoller,
    DeviceRecord, DeviceSpec, DiscoveryMode, InterfaceMode, InventoryResult, NeighborRecord,
    PollSettings, SnapshotDevice, VendorDriver,
};
use netdev_inventory_test::{device_fixtures, neighbor, FakeResolver, RecordVerifier};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

fn resolver() -> FakeResolver {
    let addr: IpAddr = "192.0.2.10".parse().unwrap();
    FakeResolver::new().with_host("sw1.example.net", &[addr])
}

fn specs() -> Vec<DeviceSpec> {
    let config = AppConfig {
        remove_domains: vec!["example.net".to_string()],
        ..AppConfig::default()
    };
    DeviceList::load(fixtures_dir().join("devices.yml"))
        .unwrap()
        .specs(&config)
}

fn spec(name: &str) -> DeviceSpec {
    specs()
        .into_iter()
        .find(|spec| spec.name == name)
        .unwrap()
}

fn poll_snapshot(spec: &DeviceSpec) -> InventoryResult<(DeviceRecord, Vec<NeighborRecord>)> {
    let dir = spec.snapshot.as_ref().unwrap();
    let mut device = SnapshotDevice::new(&spec.name, dir, &spec.vendor);
    let resolver = resolver();

    with_session(&mut device, |device| {
        let caps = select_capabilities(&spec.vendor, &spec.name, device);
        let poller = DevicePoller::new(device, caps, &resolver, &spec.settings);
        let record = poller.poll()?;
        let neighbors = poller.neighbors().collect::<InventoryResult<Vec<_>>>()?;
        Ok((record, neighbors))
    })
}

#[test]
fn test_device_list_fixture() {
    let specs = specs();
    assert_eq!(specs.len(), 3);

    let sw1 = spec("sw1.example.net");
    assert_eq!(sw1.vendor, VendorDriver::NxosSsh);
    assert_eq!(sw1.settings.target, "192.0.2.10");
    assert_eq!(sw1.settings.discovery, DiscoveryMode::Multiple);
    assert_eq!(sw1.snapshot, Some(fixtures_dir().join("nxos-sw1")));

    let leaf = spec("leaf9.example.net");
    assert_eq!(leaf.vendor, VendorDriver::Other("eos".to_string()));
    assert_eq!(leaf.snapshot, None);
}

/// NX-OS snapshot with transceivers, VLAN port lists, a LAG and CDP.
#[test]
fn test_nxos_snapshot() {
    let (record, neighbors) = poll_snapshot(&spec("sw1.example.net")).unwrap();
    let verifier = RecordVerifier::new(&record);
    verifier.assert_invariants().unwrap();

    assert_eq!(record.serial.as_deref(), Some("FDO21120U8N"));
    assert_eq!(record.primary_ip4, Some("192.0.2.10".parse().unwrap()));
    assert_eq!(record.primary_ip6, None);
    assert_eq!(record.interfaces.len(), 9);
    assert!(!record.interfaces.contains_key("loopback0"));

    let uplink = verifier.interface("Ethernet1/1").unwrap();
    assert_eq!(uplink.if_type, types::SFP_PLUS);
    assert_eq!(uplink.untagged_vlan, Some(99));
    assert_eq!(uplink.tagged_vlans, vec![10, 20]);
    assert_eq!(
        uplink.mac_address.map(|mac| mac.to_string()).as_deref(),
        Some("00:11:22:aa:bb:01")
    );

    let access = verifier.interface("Ethernet1/2").unwrap();
    assert_eq!(access.if_type, types::ETH1000);
    assert_eq!(access.mode, Some(InterfaceMode::Access));
    assert_eq!(access.untagged_vlan, Some(20));
    assert!(access.mac_address.is_some());

    let member = verifier.interface("Ethernet1/3").unwrap();
    assert_eq!(member.if_type, types::QSFP28);
    assert_eq!(member.mac_address, None);
    assert_eq!(member.untagged_vlan, None);
    assert_eq!(member.tagged_vlans, vec![10]);
    assert_eq!(member.lag.as_deref(), Some("port-channel10"));

    let lag = verifier.interface("port-channel10").unwrap();
    assert_eq!(lag.if_type, TYPE_LAG);
    assert_eq!(lag.mode, None);

    let routed = verifier.interface("Ethernet1/4").unwrap();
    assert_eq!(routed.mode, Some(InterfaceMode::Tagged));
    assert_eq!(routed.ip[0].to_string(), "10.1.0.1/30");

    assert_eq!(verifier.interface("Ethernet1/5").unwrap().tagged_vlans, vec![30]);
    let edge = verifier.interface("Ethernet1/6").unwrap();
    assert_eq!(edge.untagged_vlan, Some(30));
    assert!(edge.tagged_vlans.is_empty());

    assert_eq!(verifier.interface("Vlan10").unwrap().if_type, "Virtual");
    assert_eq!(verifier.interface("mgmt0").unwrap().if_type, types::ETH1000);

    assert_eq!(
        neighbors,
        vec![
            neighbor("Ethernet1/1", "core1", "Ethernet1/49"),
            neighbor("Eth1/5", "esx1", "vmnic0").with_mgmt_id("00:00:5e:00:53:05"),
        ]
    );
}

#[test]
fn test_junos_snapshot() {
    let (record, neighbors) = poll_snapshot(&spec("edge1.example.net")).unwrap();
    let verifier = RecordVerifier::new(&record);
    verifier.assert_invariants().unwrap();

    assert_eq!(record.serial.as_deref(), Some("JN11D3ADBEEF"));
    assert_eq!(record.primary_ip4, None);

    assert_eq!(verifier.interface("ge-0/0/0").unwrap().if_type, types::SFP);
    assert_eq!(verifier.interface("ge-0/0/1").unwrap().lag.as_deref(), Some("ae0"));

    let bundle = verifier.interface("ae0").unwrap();
    assert_eq!(bundle.if_type, TYPE_LAG);
    assert_eq!(bundle.ip[0].to_string(), "203.0.113.1/31");

    let irb = verifier.interface("irb").unwrap();
    assert_eq!(irb.mac_address, None);
    assert_eq!(irb.ip[0].to_string(), "2001:db8:10::1/64");

    assert_eq!(
        neighbors,
        vec![neighbor("ge-0/0/0", "sw1", "Ethernet1/6").with_mgmt_id("00:11:22:aa:bb:06")]
    );
}

#[test]
fn test_snapshot_session_released() {
    let spec = spec("sw1.example.net");
    let dir = spec.snapshot.clone().unwrap();
    let mut device = SnapshotDevice::new(&spec.name, dir, &spec.vendor);

    let result: InventoryResult<()> = with_session(&mut device, |device| {
        assert!(device.is_open());
        Err(netdev_inventory::InventoryError::driver("get_interfaces", "timed out"))
    });

    assert!(result.is_err());
    assert!(!device.is_open());
    // A released session can be opened again
    assert!(with_session(&mut device, |_| Ok(())).is_ok());
}

/// A fake device written to disk polls the same as the fake itself.
#[test]
fn test_written_snapshot_matches_fake() {
    let fake = device_fixtures::nxos_access_switch("sw1");
    let dir = TempDir::new().unwrap();
    fake.write_snapshot(dir.path()).unwrap();

    let resolver = FakeResolver::new();
    let settings = PollSettings::new("sw1", VendorDriver::Nxos);
    let expected = DevicePoller::new(&fake, &fake, &resolver, &settings)
        .interfaces()
        .unwrap();

    let mut device = SnapshotDevice::new("sw1", dir.path(), &VendorDriver::Nxos);
    let actual = with_session(&mut device, |device| {
        DevicePoller::new(device, device, &resolver, &settings).interfaces()
    })
    .unwrap();

    assert_eq!(actual, expected);
}
