#[cfg(test)]
mod tests {
    use kodegen_bundler_installer::bundler::{
        BuildEvent, BuildOptions, BuildPhase, BuildRequest, Error, InstallerBuilder, Packager,
        PackagerInvocation, PackagerOutput, PyInstaller, Result,
    };
    use kodegen_bundler_installer::project::{FileEntry, ProjectConfig};
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Clone)]
    enum Behavior {
        /// Write these entries into `dist/`; names ending in `/` become directories.
        Produce(Vec<&'static str>),
        Fail { code: i32, stderr: &'static str },
        NoDist,
        Hang,
        /// Produce an installer and leave a read-only directory behind in the workspace.
        #[cfg(unix)]
        ProduceLocked,
    }

    /// Packaging tool stand-in that records what it saw in the workspace.
    #[derive(Clone)]
    struct StubPackager {
        behavior: Behavior,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl StubPackager {
        fn new(behavior: Behavior) -> Self {
            Self {
                behavior,
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().expect("lock").clone()
        }
    }

    impl Packager for StubPackager {
        fn name(&self) -> &str {
            "PyInstaller"
        }

        async fn package(&self, invocation: PackagerInvocation) -> Result<PackagerOutput> {
            let mut names: Vec<String> = std::fs::read_dir(&invocation.workspace)
                .expect("workspace exists")
                .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
                .collect();
            names.sort();
            self.seen.lock().expect("lock").extend(names);
            assert_eq!(
                invocation.spec_file,
                invocation.workspace.join("installer.spec")
            );

            let dist = invocation.workspace.join("dist");
            match &self.behavior {
                Behavior::Produce(entries) => {
                    std::fs::create_dir_all(&dist).expect("mkdir dist");
                    for entry in entries {
                        if let Some(dir) = entry.strip_suffix('/') {
                            std::fs::create_dir_all(dist.join(dir)).expect("mkdir");
                        } else {
                            std::fs::write(dist.join(entry), b"MZ fake").expect("write");
                        }
                    }
                    Ok(PackagerOutput {
                        exit_code: Some(0),
                        ..PackagerOutput::default()
                    })
                }
                Behavior::Fail { code, stderr } => Ok(PackagerOutput {
                    exit_code: Some(*code),
                    stdout: String::new(),
                    stderr: stderr.to_string(),
                }),
                Behavior::NoDist => Ok(PackagerOutput {
                    exit_code: Some(0),
                    ..PackagerOutput::default()
                }),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(600)).await;
                    Ok(PackagerOutput::default())
                }
                #[cfg(unix)]
                Behavior::ProduceLocked => {
                    use std::os::unix::fs::PermissionsExt;

                    std::fs::create_dir_all(&dist).expect("mkdir dist");
                    std::fs::write(dist.join("Demo_Setup.exe"), b"MZ fake").expect("write");
                    let locked = invocation.workspace.join("locked");
                    std::fs::create_dir(&locked).expect("mkdir");
                    std::fs::write(locked.join("held.log"), b"x").expect("write");
                    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o500))
                        .expect("chmod");
                    Ok(PackagerOutput {
                        exit_code: Some(0),
                        ..PackagerOutput::default()
                    })
                }
            }
        }
    }

    struct Fixture {
        _root: tempfile::TempDir,
        scratch: PathBuf,
        out: PathBuf,
        project: ProjectConfig,
    }

    fn fixture(name: &str) -> Fixture {
        let root = tempfile::tempdir().expect("tempdir");
        let scratch = root.path().join("scratch");
        let out = root.path().join("out");
        std::fs::create_dir_all(&scratch).expect("mkdir");

        let data = root.path().join("data.txt");
        std::fs::write(&data, "payload").expect("write");

        let mut project = ProjectConfig::new(name);
        project.output_dir = out.display().to_string();
        project
            .files
            .push(FileEntry::new(data.display().to_string(), "app/data.txt"));

        Fixture {
            _root: root,
            scratch,
            out,
            project,
        }
    }

    fn builder(stub: StubPackager, scratch: &Path, keep: bool) -> InstallerBuilder<StubPackager> {
        InstallerBuilder::new(
            stub,
            BuildOptions {
                workspace_root: Some(scratch.to_path_buf()),
                keep_workspace: keep,
                ..BuildOptions::default()
            },
        )
    }

    fn scratch_entries(scratch: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(scratch)
            .expect("read scratch")
            .map(|e| e.expect("entry").path())
            .collect()
    }

    fn logs(events: &[BuildEvent]) -> Vec<&str> {
        events
            .iter()
            .filter_map(|e| match e {
                BuildEvent::Log { message } => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    fn percents(events: &[BuildEvent]) -> Vec<u8> {
        events
            .iter()
            .filter_map(|e| match e {
                BuildEvent::Progress { percent, .. } => Some(*percent),
                _ => None,
            })
            .collect()
    }

    fn assert_single_terminal_last(events: &[BuildEvent]) {
        assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
        assert!(events.last().is_some_and(BuildEvent::is_terminal));
    }

    #[tokio::test]
    async fn test_successful_build_relocates_installer() {
        let fx = fixture("Demo");
        let stub = StubPackager::new(Behavior::Produce(vec!["Demo_Setup.exe"]));
        let builder = builder(stub.clone(), &fx.scratch, false);

        let handle = builder
            .start(BuildRequest::new(&fx.project, &fx.out))
            .expect("start");
        let (events, report) = handle.collect().await;

        let artifact = fx.out.join("Demo_Setup.exe");
        assert!(report.success, "{}", report.message);
        assert_eq!(report.artifact.as_deref(), Some(artifact.as_path()));
        assert_eq!(std::fs::read(&artifact).expect("artifact"), b"MZ fake");

        assert_eq!(
            events.first(),
            Some(&BuildEvent::Progress {
                percent: 0,
                message: "Starting installer generation...".into()
            })
        );
        assert_eq!(percents(&events), [0, 5, 20, 35, 40, 80, 95, 100]);
        assert_single_terminal_last(&events);
        assert_eq!(
            events.last(),
            Some(&BuildEvent::Finished {
                success: true,
                message: artifact.display().to_string()
            })
        );

        let logs = logs(&events);
        assert_eq!(logs.first(), Some(&"=== Installer Generation Started ==="));
        assert!(logs.contains(&r#"Files in dist: ["Demo_Setup.exe"]"#));
        assert!(logs.iter().any(|l| l.starts_with("Cleaned up temp directory: ")));

        assert_eq!(stub.seen(), ["installer.py", "installer.spec"]);
        assert!(scratch_entries(&fx.scratch).is_empty());
        assert!(!builder.is_running());
    }

    #[tokio::test]
    async fn test_relocation_uses_safe_name_and_overwrites() {
        let fx = fixture("My Tool-X");
        std::fs::create_dir_all(&fx.out).expect("mkdir");
        let target = fx.out.join("My_Tool_X_Setup.exe");
        std::fs::write(&target, "stale").expect("write");

        let stub = StubPackager::new(Behavior::Produce(vec!["notes.txt", "whatever.EXE"]));
        let (_, report) = builder(stub, &fx.scratch, false)
            .start(BuildRequest::new(&fx.project, &fx.out))
            .expect("start")
            .collect()
            .await;

        assert!(report.success, "{}", report.message);
        assert_eq!(std::fs::read(&target).expect("artifact"), b"MZ fake");
    }

    #[tokio::test]
    async fn test_packaging_failure_reports_stderr_and_cleans_up() {
        let fx = fixture("Demo");
        let stub = StubPackager::new(Behavior::Fail {
            code: 2,
            stderr: "ModuleNotFoundError: No module named 'PyQt6'",
        });
        let (events, report) = builder(stub, &fx.scratch, false)
            .start(BuildRequest::new(&fx.project, &fx.out))
            .expect("start")
            .collect()
            .await;

        assert!(!report.success);
        assert!(!report.cancelled);
        assert_eq!(report.failed_phase, Some(BuildPhase::Packaging));
        assert!(report.message.starts_with("Installer generation failed: "));
        assert!(report.message.contains("exit code 2"));
        assert!(report.message.contains("No module named 'PyQt6'"));

        assert_single_terminal_last(&events);
        match events.last() {
            Some(BuildEvent::Finished { success, message }) => {
                assert!(!success);
                assert!(message.contains("No module named 'PyQt6'"));
            }
            other => panic!("unexpected last event: {other:?}"),
        }
        let logs = logs(&events);
        assert!(logs.iter().any(|l| l.starts_with("PyInstaller stderr: ")));
        assert!(logs.iter().any(|l| l.starts_with("ERROR: Installer generation failed")));
        assert!(!percents(&events).contains(&95));

        assert!(scratch_entries(&fx.scratch).is_empty());
        assert!(!fx.out.join("Demo_Setup.exe").exists());
    }

    #[tokio::test]
    async fn test_missing_executable_lists_dist_contents() {
        let fx = fixture("Demo");
        let stub = StubPackager::new(Behavior::Produce(vec!["readme.txt", "lib/", "fake.exe/"]));
        let (events, report) = builder(stub, &fx.scratch, false)
            .start(BuildRequest::new(&fx.project, &fx.out))
            .expect("start")
            .collect()
            .await;

        assert!(!report.success);
        assert_eq!(report.failed_phase, Some(BuildPhase::Collecting));
        assert!(report.message.contains("No .exe file found"));
        assert!(report.message.contains("readme.txt"));
        assert!(report.message.contains("lib"));
        assert_single_terminal_last(&events);
        assert!(scratch_entries(&fx.scratch).is_empty());
    }

    #[tokio::test]
    async fn test_missing_dist_directory_fails() {
        let fx = fixture("Demo");
        let (events, report) = builder(StubPackager::new(Behavior::NoDist), &fx.scratch, false)
            .start(BuildRequest::new(&fx.project, &fx.out))
            .expect("start")
            .collect()
            .await;

        assert!(!report.success);
        assert!(report.message.contains("Dist directory not found"));
        assert_eq!(report.failed_phase, Some(BuildPhase::Collecting));
        assert_single_terminal_last(&events);
    }

    #[tokio::test]
    async fn test_keep_workspace_leaves_sources_on_disk() {
        let fx = fixture("Demo");
        let stub = StubPackager::new(Behavior::Produce(vec!["Demo_Setup.exe"]));
        let (events, report) = builder(stub, &fx.scratch, true)
            .start(BuildRequest::new(&fx.project, &fx.out))
            .expect("start")
            .collect()
            .await;

        assert!(report.success, "{}", report.message);
        let entries = scratch_entries(&fx.scratch);
        assert_eq!(entries.len(), 1);
        let workspace = &entries[0];
        assert!(
            workspace
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("instgen_"))
        );
        assert!(workspace.join("installer.py").is_file());
        assert!(workspace.join("installer.spec").is_file());
        assert!(logs(&events).iter().any(|l| l.starts_with("Keeping temp directory: ")));
    }

    #[tokio::test]
    async fn test_cancel_during_packaging_kills_run() {
        let fx = fixture("Demo");
        let builder = builder(StubPackager::new(Behavior::Hang), &fx.scratch, false);
        let mut handle = builder
            .start(BuildRequest::new(&fx.project, &fx.out))
            .expect("start");

        let mut events = Vec::new();
        while let Some(event) = handle.next_event().await {
            let packaging = matches!(event, BuildEvent::Progress { percent: 40, .. });
            events.push(event);
            if packaging {
                break;
            }
        }
        handle.cancel();

        let (rest, report) = tokio::time::timeout(Duration::from_secs(10), handle.collect())
            .await
            .expect("cancelled run finishes");
        events.extend(rest);

        assert!(!report.success);
        assert!(report.cancelled);
        assert_eq!(report.failed_phase, Some(BuildPhase::Packaging));
        assert!(report.message.contains("cancelled during packaging"));
        assert_single_terminal_last(&events);
        assert!(scratch_entries(&fx.scratch).is_empty());
        assert!(!builder.is_running());
    }

    #[tokio::test]
    async fn test_cancel_before_first_phase_creates_nothing() {
        let fx = fixture("Demo");
        let stub = StubPackager::new(Behavior::Produce(vec!["Demo_Setup.exe"]));
        let builder = builder(stub.clone(), &fx.scratch, false);
        let handle = builder
            .start(BuildRequest::new(&fx.project, &fx.out))
            .expect("start");
        handle.cancel();

        let (events, report) = handle.collect().await;
        assert!(report.cancelled);
        assert_single_terminal_last(&events);
        assert!(stub.seen().is_empty());
        assert!(scratch_entries(&fx.scratch).is_empty());
    }

    #[tokio::test]
    async fn test_second_start_is_rejected_while_running() {
        let fx = fixture("Demo");
        let builder = builder(StubPackager::new(Behavior::Hang), &fx.scratch, false);
        let first = builder
            .start(BuildRequest::new(&fx.project, &fx.out))
            .expect("start");

        assert!(builder.is_running());
        assert!(matches!(
            builder.start(BuildRequest::new(&fx.project, &fx.out)),
            Err(Error::BuildInProgress)
        ));

        first.cancel();
        let report = first.wait().await;
        assert!(report.cancelled);
        assert!(!builder.is_running());

        let again = builder
            .start(BuildRequest::new(&fx.project, &fx.out))
            .expect("start after finish");
        again.cancel();
        again.wait().await;
    }

    #[tokio::test]
    async fn test_dropped_receiver_does_not_stop_build() {
        let fx = fixture("Demo");
        let stub = StubPackager::new(Behavior::Produce(vec!["Demo_Setup.exe"]));
        let report = builder(stub, &fx.scratch, false)
            .start(BuildRequest::new(&fx.project, &fx.out))
            .expect("start")
            .wait()
            .await;
        assert!(report.success, "{}", report.message);
        assert!(fx.out.join("Demo_Setup.exe").is_file());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cancel_kills_packager_process() {
        let fx = fixture("Demo");
        let marker = fx.scratch.parent().expect("root").join("marker");
        let packager = PyInstaller::new(
            "sh",
            vec![
                "-c".into(),
                format!("sleep 2; touch '{}'", marker.display()),
                "sh".into(),
            ],
        );
        let builder = InstallerBuilder::new(
            packager,
            BuildOptions {
                workspace_root: Some(fx.scratch.clone()),
                ..BuildOptions::default()
            },
        );
        let mut handle = builder
            .start(BuildRequest::new(&fx.project, &fx.out))
            .expect("start");

        while let Some(event) = handle.next_event().await {
            if matches!(event, BuildEvent::Progress { percent: 40, .. }) {
                break;
            }
        }
        handle.cancel();
        let report = tokio::time::timeout(Duration::from_secs(10), handle.wait())
            .await
            .expect("cancelled run finishes");
        assert!(report.cancelled);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(!marker.exists());
        assert!(scratch_entries(&fx.scratch).is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cleanup_failure_is_only_a_warning() {
        use std::os::unix::fs::PermissionsExt;

        let fx = fixture("Demo");

        // Root ignores directory permissions.
        let check = fx.scratch.join("check");
        std::fs::create_dir(&check).expect("mkdir");
        std::fs::set_permissions(&check, std::fs::Permissions::from_mode(0o500)).expect("chmod");
        let permissions_enforced = std::fs::write(check.join("x"), b"x").is_err();
        std::fs::set_permissions(&check, std::fs::Permissions::from_mode(0o700)).expect("chmod");
        std::fs::remove_dir_all(&check).expect("rm");
        if !permissions_enforced {
            return;
        }

        let stub = StubPackager::new(Behavior::ProduceLocked);
        let (events, report) = builder(stub, &fx.scratch, false)
            .start(BuildRequest::new(&fx.project, &fx.out))
            .expect("start")
            .collect()
            .await;

        assert!(report.success, "{}", report.message);
        assert!(fx.out.join("Demo_Setup.exe").is_file());
        assert!(
            logs(&events)
                .iter()
                .any(|l| l.starts_with("Warning: Could not clean temp directory: "))
        );
        assert_single_terminal_last(&events);

        for workspace in scratch_entries(&fx.scratch) {
            let locked = workspace.join("locked");
            if locked.exists() {
                std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o700))
                    .expect("chmod");
            }
        }
    }
}
