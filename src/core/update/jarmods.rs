// ─── Modded Jar ───
// Layers jar mods over the base game jar.

use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::info;
use zip::{ZipArchive, ZipWriter};

use crate::core::error::{LauncherError, LauncherResult};

fn copy_entries(
    source: &Path,
    writer: &mut ZipWriter<File>,
    seen: &mut HashSet<String>,
    skip_signatures: bool,
) -> LauncherResult<()> {
    let file = File::open(source).map_err(|e| LauncherError::io(source, e))?;
    let mut archive = ZipArchive::new(file)?;

    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i)?;
        let name = entry.name().to_string();
        if skip_signatures && name.starts_with("META-INF/") {
            continue;
        }
        if !seen.insert(name) {
            continue;
        }
        writer.raw_copy_file(entry)?;
    }
    Ok(())
}

/// Write `output` from `base` with `mods` layered on top. A later mod wins
/// over an earlier one for the same entry; every mod wins over the base jar,
/// whose signature files are dropped.
pub fn build_modded_jar(base: &Path, output: &Path, mods: &[PathBuf]) -> LauncherResult<()> {
    if output.exists() {
        std::fs::remove_file(output).map_err(|e| LauncherError::io(output, e))?;
    }
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent).map_err(|e| LauncherError::io(parent, e))?;
    }

    let out = File::create(output).map_err(|e| LauncherError::io(output, e))?;
    let mut writer = ZipWriter::new(out);
    let mut seen = HashSet::new();

    for jar_mod in mods.iter().rev() {
        copy_entries(jar_mod, &mut writer, &mut seen, false)?;
    }
    copy_entries(base, &mut writer, &mut seen, true)?;
    writer.finish()?;

    info!("Built modded jar {:?} with {} jar mods", output, mods.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    use zip::write::SimpleFileOptions;

    use crate::core::test_support::TempDir;

    fn write_jar(path: &Path, entries: &[(&str, &str)]) {
        let mut writer = ZipWriter::new(File::create(path).unwrap());
        for (name, content) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    fn read_entry(archive: &mut ZipArchive<File>, name: &str) -> Option<String> {
        let mut entry = archive.by_name(name).ok()?;
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        Some(content)
    }

    #[test]
    fn later_mods_override_earlier_ones_and_the_base() {
        let temp = TempDir::new("jarmods-build");
        let base = temp.path().join("minecraft.jar");
        let first = temp.path().join("first.jar");
        let second = temp.path().join("second.jar");
        write_jar(
            &base,
            &[
                ("net/minecraft/Foo.class", "base"),
                ("b.class", "base-b"),
                ("META-INF/MOJANG_C.SF", "signature"),
            ],
        );
        write_jar(&first, &[("b.class", "first")]);
        write_jar(&second, &[("b.class", "second"), ("c.class", "second")]);

        let output = temp.path().join("instance/temp.jar");
        build_modded_jar(&base, &output, &[first, second]).unwrap();

        let mut archive = ZipArchive::new(File::open(&output).unwrap()).unwrap();
        assert_eq!(read_entry(&mut archive, "net/minecraft/Foo.class").as_deref(), Some("base"));
        assert_eq!(read_entry(&mut archive, "b.class").as_deref(), Some("second"));
        assert_eq!(read_entry(&mut archive, "c.class").as_deref(), Some("second"));
        assert!(read_entry(&mut archive, "META-INF/MOJANG_C.SF").is_none());
        assert_eq!(archive.len(), 3);
    }

    #[test]
    fn missing_base_jar_fails() {
        let temp = TempDir::new("jarmods-missing");
        let err = build_modded_jar(
            &temp.path().join("nope.jar"),
            &temp.path().join("temp.jar"),
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, LauncherError::Io { .. }));
    }
}
