//! Poll pipeline integration tests
//!
//! Drives the full device poll through in-memory fake devices.

use std::net::IpAddr;

use netdev_inventory::constants::TYPE_LAG;
use netdev_inventory::{
    select_capabilities, with_session, DevicePoller, InterfaceMode, InventoryError,
    PollSettings, RawInterfaceSample, StubCapabilities, VendorDriver,
};
use netdev_inventory_test::{
    device_fixtures, FakeDevice, FakeResolver, Operation, RecordVerifier,
};
use pretty_assertions::assert_eq;

const HOST: &str = "sw1.example.net";

fn resolver() -> FakeResolver {
    let v4: IpAddr = "192.0.2.10".parse().unwrap();
    let v6: IpAddr = "2001:db8::10".parse().unwrap();
    FakeResolver::new().with_host(HOST, &[v4, v6])
}

fn settings() -> PollSettings {
    PollSettings::new(HOST, VendorDriver::NxosSsh)
}

/// Full pipeline on an access switch.
///
/// Scenario:
/// 1. Classify six interfaces and fold one subinterface
/// 2. Move the native VLAN of the uplink trunk out of its tagged list
/// 3. Attach a LAG member and type its parent
/// 4. Fold subinterface addresses into the parent
#[test]
fn test_access_switch_record() {
    let device = device_fixtures::nxos_access_switch(HOST);
    let resolver = resolver();
    let settings = settings();

    let record = DevicePoller::new(&device, &device, &resolver, &settings)
        .poll()
        .unwrap();
    let verifier = RecordVerifier::new(&record);
    verifier.assert_invariants().unwrap();

    assert_eq!(record.serial.as_deref(), Some("FDO21120U8N"));
    assert_eq!(record.primary_ip4, Some("192.0.2.10".parse().unwrap()));
    assert_eq!(record.primary_ip6, Some("2001:db8::10".parse().unwrap()));
    assert_eq!(
        record.interfaces.keys().collect::<Vec<_>>(),
        vec![
            "Ethernet1/1",
            "Ethernet1/2",
            "Ethernet1/3",
            "Ethernet1/4",
            "Vlan10",
            "port-channel10"
        ]
    );

    let uplink = verifier.interface("Ethernet1/1").unwrap();
    assert_eq!(uplink.description, "uplink to core1");
    assert_eq!(uplink.mtu, Some(9216));
    assert!(uplink.mac_address.is_some());
    assert_eq!(uplink.if_type, "SFP+ (10GE)");
    assert_eq!(uplink.mode, Some(InterfaceMode::Tagged));
    assert_eq!(uplink.untagged_vlan, Some(99));
    assert_eq!(uplink.tagged_vlans, vec![10, 20]);

    let access = verifier.interface("Ethernet1/2").unwrap();
    assert_eq!(access.mode, Some(InterfaceMode::Access));
    assert_eq!(access.untagged_vlan, Some(20));
    assert!(access.tagged_vlans.is_empty());
    assert_eq!(access.if_type, "Other");

    let member = verifier.interface("Ethernet1/3").unwrap();
    assert!(!member.enabled);
    assert_eq!(member.untagged_vlan, None);
    assert_eq!(member.tagged_vlans, vec![10]);
    assert_eq!(member.lag.as_deref(), Some("port-channel10"));
    assert_eq!(verifier.interface("port-channel10").unwrap().if_type, TYPE_LAG);

    let routed = verifier.interface("Ethernet1/4").unwrap();
    assert_eq!(routed.mode, Some(InterfaceMode::Tagged));
    assert_eq!(
        routed.ip.iter().map(ToString::to_string).collect::<Vec<_>>(),
        vec!["10.1.0.1/30"]
    );

    let svi = verifier.interface("Vlan10").unwrap();
    assert_eq!(svi.if_type, "Virtual");
    assert_eq!(
        svi.ip.iter().map(ToString::to_string).collect::<Vec<_>>(),
        vec!["192.0.2.1/24", "2001:db8::1/64"]
    );
}

#[test]
fn test_stub_capabilities_defaults() {
    let device = device_fixtures::nxos_access_switch(HOST);
    let resolver = resolver();
    let settings = settings();

    let record = DevicePoller::new(&device, &StubCapabilities, &resolver, &settings)
        .poll()
        .unwrap();

    let uplink = &record.interfaces["Ethernet1/1"];
    assert_eq!(uplink.if_type, "Other");
    assert_eq!(uplink.mode, None);
    assert_eq!(uplink.untagged_vlan, None);
    assert!(uplink.tagged_vlans.is_empty());
    assert_eq!(record.interfaces["Ethernet1/3"].lag, None);
    // Subinterface inference does not depend on the provider
    assert_eq!(record.interfaces["Ethernet1/4"].mode, Some(InterfaceMode::Tagged));
    assert_eq!(device.calls(Operation::InterfaceType), 0);
}

#[test]
fn test_unknown_vendor_falls_back_to_stub() {
    let device = device_fixtures::nxos_access_switch(HOST);
    let vendor = VendorDriver::Other("eos".to_string());
    let caps = select_capabilities(&vendor, HOST, &device);
    let resolver = resolver();
    let settings = PollSettings::new(HOST, vendor.clone());

    let record = DevicePoller::new(&device, caps, &resolver, &settings)
        .poll()
        .unwrap();
    assert_eq!(record.interfaces["Ethernet1/1"].mode, None);
    assert_eq!(device.calls(Operation::InterfaceMode), 0);
}

#[test]
fn test_access_vlan_unsupported() {
    let device = FakeDevice::new(HOST)
        .with_port("Gi0/1")
        .with_mode("Gi0/1", "access");
    let resolver = resolver();
    let settings = settings();

    let record = DevicePoller::new(&device, &device, &resolver, &settings)
        .poll()
        .unwrap();
    let port = &record.interfaces["Gi0/1"];
    assert_eq!(port.mode, Some(InterfaceMode::Access));
    assert_eq!(port.untagged_vlan, None);
}

/// An access port carrying subinterfaces is reported as tagged, and with no
/// native VLAN answer its access VLAN must not linger next to the tagged list.
#[test]
fn test_promoted_access_port_keeps_vlans_consistent() {
    let device = FakeDevice::new(HOST)
        .with_port("Eth1")
        .with_port("Eth1.5")
        .with_mode("Eth1", "access")
        .with_access_vlan("Eth1", 10)
        .with_tagged_vlans("Eth1", &[10, 20]);
    let resolver = resolver();
    let settings = settings();

    let record = DevicePoller::new(&device, &device, &resolver, &settings)
        .poll()
        .unwrap();
    let verifier = RecordVerifier::new(&record);
    verifier.assert_native_vlans_untagged().unwrap();
    verifier.assert_invariants().unwrap();

    let port = verifier.interface("Eth1").unwrap();
    assert_eq!(port.mode, Some(InterfaceMode::Tagged));
    assert_eq!(port.untagged_vlan, None);
    assert_eq!(port.tagged_vlans, vec![10, 20]);
    assert_eq!(device.calls(Operation::NativeVlan), 1);
}

#[test]
fn test_promoted_access_port_with_native_vlan() {
    let device = FakeDevice::new(HOST)
        .with_port("Eth1")
        .with_port("Eth1.5")
        .with_mode("Eth1", "access")
        .with_access_vlan("Eth1", 10)
        .with_tagged_vlans("Eth1", &[10, 20])
        .with_native_vlan("Eth1", 10);
    let resolver = resolver();
    let settings = settings();

    let record = DevicePoller::new(&device, &device, &resolver, &settings)
        .poll()
        .unwrap();
    RecordVerifier::new(&record).assert_invariants().unwrap();

    let port = &record.interfaces["Eth1"];
    assert_eq!(port.untagged_vlan, Some(10));
    assert_eq!(port.tagged_vlans, vec![20]);
}

#[test]
fn test_empty_device() {
    let device = FakeDevice::new(HOST).with_all_capabilities();
    let resolver = resolver();
    let settings = settings();

    let record = DevicePoller::new(&device, &device, &resolver, &settings)
        .poll()
        .unwrap();
    assert!(record.interfaces.is_empty());
    assert_eq!(record.serial, None);
}

#[test]
fn test_recoverable_failures_omit_fields() {
    let device = device_fixtures::nxos_access_switch(HOST).failing(Operation::Facts);
    let settings = settings();

    let record = DevicePoller::new(&device, &device, &FakeResolver::new(), &settings)
        .poll()
        .unwrap();
    assert_eq!(record.serial, None);
    assert_eq!(record.primary_ip4, None);
    assert_eq!(record.primary_ip6, None);
    assert_eq!(record.interfaces.len(), 6);
}

/// The management address override only affects how the device is reached;
/// primary addresses come from the hostname.
#[test]
fn test_resolves_hostname_not_target() {
    let device = FakeDevice::new(HOST);
    let resolver = resolver().with_host("10.9.9.9", &["10.9.9.9".parse().unwrap()]);
    let settings = settings().with_target("10.9.9.9");

    let ips = DevicePoller::new(&device, &device, &resolver, &settings)
        .primary_ips()
        .unwrap();
    assert_eq!(ips.ipv4, Some("192.0.2.10".parse().unwrap()));
    assert_eq!(ips.ipv6, Some("2001:db8::10".parse().unwrap()));
}

#[test]
fn test_unresolvable_hostname_with_target() {
    let device = FakeDevice::new(HOST);
    let resolver = FakeResolver::new().with_host("10.9.9.9", &["10.9.9.9".parse().unwrap()]);
    let settings = settings().with_target("10.9.9.9");
    let poller = DevicePoller::new(&device, &device, &resolver, &settings);

    assert!(matches!(
        poller.primary_ips(),
        Err(InventoryError::NoReverseFound { host }) if host == HOST
    ));
    let record = poller.poll().unwrap();
    assert_eq!(record.primary_ip4, None);
}

#[test]
fn test_assembly_failures_abort() {
    let resolver = resolver();
    let settings = settings();

    for operation in [
        Operation::Interfaces,
        Operation::InterfaceType,
        Operation::NativeVlan,
        Operation::LagMembership,
        Operation::InterfaceIpTable,
    ] {
        let device = device_fixtures::nxos_access_switch(HOST).failing(operation);
        let result = DevicePoller::new(&device, &device, &resolver, &settings).poll();
        assert!(
            matches!(result, Err(InventoryError::Driver { .. })),
            "{:?} should abort the poll",
            operation
        );
    }
}

#[test]
fn test_session_closed_on_failure() {
    let mut device = device_fixtures::nxos_access_switch(HOST).failing(Operation::Interfaces);
    let resolver = resolver();
    let settings = settings();

    let result = with_session(&mut device, |device| {
        DevicePoller::new(device, device, &resolver, &settings).poll()
    });

    assert!(result.is_err());
    assert_eq!(device.calls(Operation::Open), 1);
    assert_eq!(device.calls(Operation::Close), 1);
}

#[test]
fn test_session_not_closed_when_open_fails() {
    let mut device = FakeDevice::new(HOST).failing(Operation::Open);

    let result = with_session(&mut device, |_| Ok(()));

    assert!(result.is_err());
    assert_eq!(device.calls(Operation::Close), 0);
}

#[test]
fn test_polls_are_independent() {
    let device = device_fixtures::nxos_access_switch(HOST);
    let resolver = resolver();
    let settings = settings();
    let poller = DevicePoller::new(&device, &device, &resolver, &settings);

    let first = poller.poll().unwrap();
    let second = poller.poll().unwrap();
    assert_eq!(first, second);
    assert_eq!(device.calls(Operation::Interfaces), 2);
}

#[test]
fn test_subinterface_without_parent_is_dropped() {
    let device = FakeDevice::new(HOST)
        .with_port("Ethernet1/5.200")
        .with_interface(
            "vlan.100",
            RawInterfaceSample::new(true).with_description("x".repeat(150)),
        );
    let resolver = resolver();
    let settings = settings();

    let record = DevicePoller::new(&device, &device, &resolver, &settings)
        .poll()
        .unwrap();
    RecordVerifier::new(&record).assert_invariants().unwrap();
    assert_eq!(record.interfaces.keys().collect::<Vec<_>>(), vec!["vlan.100"]);
    assert_eq!(record.interfaces["vlan.100"].description.chars().count(), 100);
}
