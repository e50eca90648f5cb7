// ─── Game Update Task ───
// Brings an instance's files in line with its resolved profile.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::core::downloader::{ArtifactFetcher, DownloadEntry};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::instance::InstanceDirs;
use crate::core::profile::ResolvedProfile;
use crate::core::version::{RuleContext, VersionCatalog};

use super::jarmods::build_modded_jar;
use super::libraries::plan_library_downloads;

/// Artifact whose library file is the unmodified game jar.
const GAME_JAR_ARTIFACT: &str = "net.minecraft:minecraft";

/// Everything an update needs besides the profile itself.
pub struct UpdateContext<'a> {
    pub instance: &'a InstanceDirs,
    pub libraries_dir: &'a Path,
    pub catalog: &'a dyn VersionCatalog,
    pub fetcher: &'a dyn ArtifactFetcher,
    pub rules: RuleContext,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct UpdateReport {
    pub libraries_downloaded: usize,
    pub libraries_present: usize,
    pub modded_jar: Option<PathBuf>,
    pub fml_libraries_downloaded: usize,
}

async fn fetch_or_fail(fetcher: &dyn ArtifactFetcher, entries: Vec<DownloadEntry>) -> LauncherResult<()> {
    if entries.is_empty() {
        return Ok(());
    }
    let failed = fetcher.fetch_all(entries).await;
    if failed.is_empty() {
        return Ok(());
    }
    for (entry, error) in &failed {
        warn!("Download of {} failed: {}", entry.url, error);
    }
    let mut urls: Vec<String> = failed.into_iter().map(|(entry, _)| entry.url).collect();
    urls.sort();
    Err(LauncherError::DownloadsFailed(urls))
}

/// Run the update for `resolved`: fetch missing libraries, build the
/// modded jar when jar mods are present and fetch legacy FML libraries
/// when the profile asks for them.
pub async fn update_game(ctx: &UpdateContext<'_>, resolved: &ResolvedProfile) -> LauncherResult<UpdateReport> {
    let minecraft_root = ctx.instance.minecraft_root();
    tokio::fs::create_dir_all(&minecraft_root)
        .await
        .map_err(|e| LauncherError::io(&minecraft_root, e))?;

    let mut report = UpdateReport::default();

    // ── Libraries ──
    let plan = plan_library_downloads(resolved, ctx.libraries_dir, &ctx.rules)?;
    report.libraries_present = plan.present;
    report.libraries_downloaded = plan.downloads.len();
    fetch_or_fail(ctx.fetcher, plan.downloads).await?;

    // ── Jar mods ──
    let steps = resolved.steps();
    if steps.build_jar {
        report.modded_jar = Some(build_jar(ctx, resolved).await?);
    }

    // ── Legacy FML ──
    if steps.legacy_fml {
        report.fml_libraries_downloaded = fetch_fml_libraries(ctx, resolved).await?;
    }

    info!(
        "Update finished: {} libraries fetched, {} present",
        report.libraries_downloaded, report.libraries_present
    );
    Ok(report)
}

async fn build_jar(ctx: &UpdateContext<'_>, resolved: &ResolvedProfile) -> LauncherResult<PathBuf> {
    let base = resolved
        .active_normal_libs(&ctx.rules)
        .iter()
        .find(|lib| lib.identity() == GAME_JAR_ARTIFACT)
        .map(|lib| ctx.libraries_dir.join(lib.storage_path(&ctx.rules.os)))
        .ok_or_else(|| {
            LauncherError::Other(format!(
                "No {} library to build the modded jar from",
                GAME_JAR_ARTIFACT
            ))
        })?;

    let jarmods_dir = ctx.instance.jarmods_dir();
    let mods: Vec<PathBuf> = resolved
        .jar_mods()
        .iter()
        .map(|jar_mod| jarmods_dir.join(&jar_mod.name))
        .collect();
    let output = ctx.instance.modded_jar_path();

    let target = output.clone();
    tokio::task::spawn_blocking(move || build_modded_jar(&base, &target, &mods))
        .await
        .map_err(|e| LauncherError::Other(format!("Jar mod task failed: {}", e)))??;
    Ok(output)
}

async fn fetch_fml_libraries(ctx: &UpdateContext<'_>, resolved: &ResolvedProfile) -> LauncherResult<usize> {
    let lib_dir = ctx.instance.fml_lib_dir();
    let entries: Vec<DownloadEntry> = ctx
        .catalog
        .fml_libraries(resolved.minecraft_version())
        .into_iter()
        .filter(|lib| !lib_dir.join(&lib.filename).exists())
        .map(|lib| DownloadEntry::new(lib.url, lib_dir.join(&lib.filename)).with_sha1(lib.sha1))
        .collect();

    let count = entries.len();
    if count > 0 {
        info!("Fetching {} legacy FML libraries into {:?}", count, lib_dir);
    }
    fetch_or_fail(ctx.fetcher, entries).await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Arc;

    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    use crate::core::downloader::recording::RecordingFetcher;
    use crate::core::profile::{FORGE_UID, LEGACY_FML_TRAIT, MINECRAFT_UID};
    use crate::core::test_support::TempDir;
    use crate::core::version::{FmlLibrary, InMemoryCatalog, JarMod, Library, VersionPatch};

    struct Fixture {
        temp: TempDir,
        dirs: InstanceDirs,
        catalog: InMemoryCatalog,
    }

    impl Fixture {
        fn new(label: &str) -> Self {
            let temp = TempDir::new(label);
            let dirs = InstanceDirs::new(temp.path().join("instance"));
            let catalog = InMemoryCatalog::new().with_fml_libraries(
                "1.5.2",
                vec![FmlLibrary {
                    filename: "argo-small-3.2.jar".into(),
                    url: "https://files.example.org/fmllibs/argo-small-3.2.jar".into(),
                    sha1: None,
                }],
            );
            Self { temp, dirs, catalog }
        }

        fn libraries_dir(&self) -> PathBuf {
            self.temp.path().join("libraries")
        }

        fn context<'a>(&'a self, fetcher: &'a RecordingFetcher, libraries_dir: &'a Path) -> UpdateContext<'a> {
            UpdateContext {
                instance: &self.dirs,
                libraries_dir,
                catalog: &self.catalog,
                fetcher,
                rules: RuleContext::client().with_os("linux"),
            }
        }
    }

    fn minecraft_patch(version: &str) -> VersionPatch {
        let mut patch = VersionPatch::new(MINECRAFT_UID, "Minecraft");
        patch.version = version.into();
        patch.order = -2;
        patch.override_libs = Some(vec![
            Arc::new(Library::new("net.minecraft:minecraft:1.5.2").unwrap()),
            Arc::new(Library::new("com.example:util:1").unwrap()),
        ]);
        patch
    }

    fn finalize(patches: &[VersionPatch]) -> ResolvedProfile {
        let mut resolved = ResolvedProfile::merge(patches).unwrap();
        resolved.derive_steps(patches);
        resolved
    }

    #[tokio::test]
    async fn downloads_missing_libraries_only() {
        let fixture = Fixture::new("update-libs");
        let libraries_dir = fixture.libraries_dir();
        let fetcher = RecordingFetcher::default();
        let resolved = finalize(&[minecraft_patch("1.5.2")]);

        let report = update_game(&fixture.context(&fetcher, &libraries_dir), &resolved)
            .await
            .unwrap();
        assert_eq!(report.libraries_downloaded, 2);
        assert!(report.modded_jar.is_none());
        assert!(fixture.dirs.minecraft_root().is_dir());

        let again = update_game(&fixture.context(&fetcher, &libraries_dir), &resolved)
            .await
            .unwrap();
        assert_eq!(again.libraries_downloaded, 0);
        assert_eq!(again.libraries_present, 2);
    }

    #[tokio::test]
    async fn reports_every_failed_download() {
        let fixture = Fixture::new("update-failed");
        let libraries_dir = fixture.libraries_dir();
        let fetcher = RecordingFetcher::failing(&[
            "https://libraries.minecraft.net/net/minecraft/minecraft/1.5.2/minecraft-1.5.2.jar",
            "https://libraries.minecraft.net/com/example/util/1/util-1.jar",
        ]);
        let resolved = finalize(&[minecraft_patch("1.5.2")]);

        let err = update_game(&fixture.context(&fetcher, &libraries_dir), &resolved)
            .await
            .unwrap_err();
        match err {
            LauncherError::DownloadsFailed(urls) => assert_eq!(urls.len(), 2),
            other => panic!("expected aggregated failures, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn builds_modded_jar_and_fetches_fml_libraries() {
        let fixture = Fixture::new("update-full");
        let libraries_dir = fixture.libraries_dir();

        let base = libraries_dir.join("net/minecraft/minecraft/1.5.2/minecraft-1.5.2.jar");
        std::fs::create_dir_all(base.parent().unwrap()).unwrap();
        let mut writer = ZipWriter::new(File::create(&base).unwrap());
        writer.start_file("Main.class", SimpleFileOptions::default()).unwrap();
        writer.write_all(b"base").unwrap();
        writer.finish().unwrap();

        let jar_mod = fixture.dirs.jarmods_dir().join("mod.jar");
        std::fs::create_dir_all(jar_mod.parent().unwrap()).unwrap();
        let mut writer = ZipWriter::new(File::create(&jar_mod).unwrap());
        writer.start_file("Mod.class", SimpleFileOptions::default()).unwrap();
        writer.write_all(b"mod").unwrap();
        writer.finish().unwrap();

        let mut forge = VersionPatch::new(FORGE_UID, "Forge");
        forge.order = 1;
        forge.traits.insert(LEGACY_FML_TRAIT.into());
        forge.jar_mods.push(JarMod {
            name: "mod.jar".into(),
            original_name: None,
        });
        let resolved = finalize(&[minecraft_patch("1.5.2"), forge]);

        let fetcher = RecordingFetcher::default();
        let report = update_game(&fixture.context(&fetcher, &libraries_dir), &resolved)
            .await
            .unwrap();

        assert_eq!(report.modded_jar, Some(fixture.dirs.modded_jar_path()));
        assert!(fixture.dirs.modded_jar_path().exists());
        assert_eq!(report.fml_libraries_downloaded, 1);
        assert!(fixture.dirs.fml_lib_dir().join("argo-small-3.2.jar").exists());
        assert!(fetcher
            .requested_urls()
            .contains(&"https://files.example.org/fmllibs/argo-small-3.2.jar".to_string()));
    }

    #[tokio::test]
    async fn fml_step_is_skipped_without_forge() {
        let fixture = Fixture::new("update-nofml");
        let libraries_dir = fixture.libraries_dir();
        let mut loader = VersionPatch::new("com.example.loader", "Loader");
        loader.traits.insert(LEGACY_FML_TRAIT.into());
        let resolved = finalize(&[minecraft_patch("1.5.2"), loader]);

        let fetcher = RecordingFetcher::default();
        let report = update_game(&fixture.context(&fetcher, &libraries_dir), &resolved)
            .await
            .unwrap();
        assert_eq!(report.fml_libraries_downloaded, 0);
        assert!(!fixture.dirs.fml_lib_dir().exists());
    }
}
