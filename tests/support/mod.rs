//! Hand-built classfile byte fixtures shared across the integration tests, in the style of
//! `classgraph::tests::empty_class_with_version` and the unit-test fixtures under
//! `src/parsing/class_parser.rs`.

#![allow(dead_code)]

fn utf8(buf: &mut Vec<u8>, s: &str) {
    buf.push(1u8);
    buf.extend_from_slice(&(s.len() as u16).to_be_bytes());
    buf.extend_from_slice(s.as_bytes());
}

/// Builds a minimal public classfile `name extends super_name`, with `interfaces` and no
/// members, at class-file version 61.0 (Java 17).
pub fn class_bytes(name: &str, super_name: Option<&str>, interfaces: &[&str]) -> Vec<u8> {
    class_bytes_with_access(name, super_name, interfaces, 0x0001)
}

/// As [`class_bytes`], but with an explicit raw `access_flags` word (e.g. `0` for
/// package-private).
pub fn class_bytes_with_access(
    name: &str,
    super_name: Option<&str>,
    interfaces: &[&str],
    access_flags: u16,
) -> Vec<u8> {
    let mut pool = Vec::new();
    let mut slot = 1u16;

    utf8(&mut pool, name);
    let name_slot = slot;
    slot += 1;
    pool.push(7u8);
    pool.extend_from_slice(&name_slot.to_be_bytes());
    let this_slot = slot;
    slot += 1;

    let super_slot = if let Some(super_name) = super_name {
        utf8(&mut pool, super_name);
        let name_slot = slot;
        slot += 1;
        pool.push(7u8);
        pool.extend_from_slice(&name_slot.to_be_bytes());
        let class_slot = slot;
        slot += 1;
        class_slot
    } else {
        0
    };

    let interface_slots: Vec<u16> = interfaces
        .iter()
        .map(|interface| {
            utf8(&mut pool, interface);
            let name_slot = slot;
            slot += 1;
            pool.push(7u8);
            pool.extend_from_slice(&name_slot.to_be_bytes());
            let class_slot = slot;
            slot += 1;
            class_slot
        })
        .collect();

    let mut buf = Vec::new();
    buf.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
    buf.extend_from_slice(&0u16.to_be_bytes()); // minor
    buf.extend_from_slice(&61u16.to_be_bytes()); // major
    buf.extend_from_slice(&slot.to_be_bytes()); // cp_count
    buf.extend_from_slice(&pool);
    buf.extend_from_slice(&access_flags.to_be_bytes());
    buf.extend_from_slice(&this_slot.to_be_bytes());
    buf.extend_from_slice(&super_slot.to_be_bytes());
    buf.extend_from_slice(&(interface_slots.len() as u16).to_be_bytes());
    for interface_slot in interface_slots {
        buf.extend_from_slice(&interface_slot.to_be_bytes());
    }
    buf.extend_from_slice(&0u16.to_be_bytes()); // fields_count
    buf.extend_from_slice(&0u16.to_be_bytes()); // methods_count
    buf.extend_from_slice(&0u16.to_be_bytes()); // attributes_count
    buf
}

/// The relative `.class` path a [`classgraph::discovery::ClasspathElement`] would be looked up
/// at for `binary_name`.
pub fn relative_path(binary_name: &str) -> String {
    format!("{}.class", binary_name.replace('.', "/"))
}
