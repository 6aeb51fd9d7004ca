// Copyright 2026 Colin Finck <colin@reactos.org>
// SPDX-License-Identifier: GPL-2.0-or-later

/// Separator between the components of a key path.
pub const PATH_SEPARATOR: char = '\\';

/// Appends the subkey `name` to the key path `parent`.
///
/// Leading and trailing separators of `parent` are ignored, so an empty parent path
/// (the root reference itself) just yields `name`.
pub(crate) fn join_path(parent: &str, name: &str) -> String {
    let parent = parent.trim_matches(PATH_SEPARATOR);

    if parent.is_empty() {
        name.to_string()
    } else {
        let mut path = String::with_capacity(parent.len() + 1 + name.len());
        path.push_str(parent);
        path.push(PATH_SEPARATOR);
        path.push_str(name);
        path
    }
}

/// Returns the path components of `path`, skipping duplicate, leading, and trailing separators.
pub(crate) fn path_components(path: &str) -> impl Iterator<Item = &str> {
    path.split(PATH_SEPARATOR)
        .filter(|component| !component.is_empty())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{join_path, path_components};
    use crate::*;

    pub(crate) const TEMP_DIR: &str = r"C:\Users\jdoe\AppData\Local\Temp";

    /// Builds the registry all tests work on:
    ///
    /// ```text
    /// HKEY_LOCAL_MACHINE
    /// ├── SOFTWARE\reg-tree-test
    /// │   ├── data-test          (one value of every supported data type)
    /// │   ├── no-subkeys
    /// │   ├── subkey-test        (key0 ... key19)
    /// │   └── walk-test          (a\a1, a\a2\deep, b)
    /// └── SYSTEM\CurrentControlSet
    ///     ├── Control\Session Manager
    ///     └── CurrentUser        (USERNAME = "jdoe")
    /// ```
    pub(crate) fn test_registry() -> MemoryRegistry {
        let registry = MemoryRegistry::new();
        let hklm = RootKey::LocalMachine;

        registry
            .create_key(hklm, r"SYSTEM\CurrentControlSet\Control\Session Manager")
            .unwrap();
        registry
            .insert_value(
                hklm,
                r"SYSTEM\CurrentControlSet\Control\Session Manager",
                "PendingFileRenameOperations",
                &Value::MultiString(vec![]),
                ValueType::RegMultiSZ,
            )
            .unwrap();
        registry
            .insert_value(
                hklm,
                r"SYSTEM\CurrentControlSet\CurrentUser",
                "USERNAME",
                &Value::String("jdoe".into()),
                ValueType::RegSZ,
            )
            .unwrap();

        let data_test = r"SOFTWARE\reg-tree-test\data-test";
        let values = [
            ("", Value::String("default".into()), ValueType::RegSZ),
            ("reg-none", Value::None, ValueType::RegNone),
            ("reg-sz", Value::String("sz-test".into()), ValueType::RegSZ),
            (
                "reg-expand-sz",
                Value::String(r"%TEMP%\cache".into()),
                ValueType::RegExpandSZ,
            ),
            (
                "reg-multi-sz",
                Value::MultiString(vec!["multi-sz-test".into(), "line2".into()]),
                ValueType::RegMultiSZ,
            ),
            ("dword", Value::Integer(42), ValueType::RegDWord),
            ("qword", Value::Integer(u64::MAX), ValueType::RegQWord),
            ("binary", Value::Binary(vec![1, 2, 3, 4, 5]), ValueType::RegBinary),
        ];
        for (name, value, value_type) in values.iter() {
            registry
                .insert_value(hklm, data_test, name, value, *value_type)
                .unwrap();
        }

        registry
            .create_key(hklm, r"SOFTWARE\reg-tree-test\no-subkeys")
            .unwrap();

        for i in 0..20 {
            registry
                .create_key(hklm, &format!(r"SOFTWARE\reg-tree-test\subkey-test\key{}", i))
                .unwrap();
        }

        for path in [r"a\a1", r"a\a2\deep", "b"].iter() {
            registry
                .create_key(hklm, &format!(r"SOFTWARE\reg-tree-test\walk-test\{}", path))
                .unwrap();
        }
        registry
            .insert_value(
                hklm,
                r"SOFTWARE\reg-tree-test\walk-test\a\a2",
                "level",
                &Value::Integer(2),
                ValueType::RegDWord,
            )
            .unwrap();

        registry.set_environment_variable("TEMP", TEMP_DIR);
        registry.mark_unresolvable("BROKEN");

        registry
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("", "SOFTWARE"), "SOFTWARE");
        assert_eq!(join_path(r"\", "SOFTWARE"), "SOFTWARE");
        assert_eq!(join_path("SYSTEM", "CurrentControlSet"), r"SYSTEM\CurrentControlSet");
        assert_eq!(
            join_path(r"SYSTEM\CurrentControlSet\", "Control"),
            r"SYSTEM\CurrentControlSet\Control"
        );
    }

    #[test]
    fn test_path_components() {
        let components: Vec<&str> = path_components(r"\\SYSTEM\\CurrentControlSet\").collect();
        assert_eq!(components, vec!["SYSTEM", "CurrentControlSet"]);
        assert_eq!(path_components("").count(), 0);
    }
}
