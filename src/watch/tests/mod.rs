//! Unit tests for event conversion and classification.
//! Classification tests touch a temporary directory but never wait on notifications.

#![allow(clippy::unwrap_used)]

use std::{fs, path::PathBuf};

use notify::{
    Event, EventKind,
    event::{AccessKind, CreateKind, DataChange, MetadataKind, ModifyKind, RemoveKind, RenameMode},
};
use tempfile::TempDir;

use super::{Action, Op, WatchEvent, WatchSession};

fn notify_event(kind: EventKind, paths: &[&str]) -> Event {
    paths
        .iter()
        .fold(Event::new(kind), |event, path| event.add_path(PathBuf::from(path)))
}

fn session_with_file(content: &str) -> (TempDir, PathBuf, WatchSession) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, content).unwrap();
    let session = WatchSession::new(&path).unwrap();
    (dir, path, session)
}

mod conversion {
    use super::*;

    #[test]
    fn data_modification_is_a_write() {
        let event = notify_event(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            &["/etc/app/config.toml"],
        );

        assert_eq!(
            WatchEvent::from_notify(event),
            vec![WatchEvent::new("/etc/app/config.toml", Op::WRITE)]
        );
    }

    #[test]
    fn create_remove_and_metadata_map_to_their_ops() {
        let create = notify_event(EventKind::Create(CreateKind::File), &["/a"]);
        let remove = notify_event(EventKind::Remove(RemoveKind::File), &["/a"]);
        let chmod = notify_event(
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)),
            &["/a"],
        );

        assert_eq!(WatchEvent::from_notify(create)[0].op, Op::CREATE);
        assert_eq!(WatchEvent::from_notify(remove)[0].op, Op::REMOVE);
        assert_eq!(WatchEvent::from_notify(chmod)[0].op, Op::CHMOD);
    }

    #[test]
    fn rename_ends_map_to_rename_and_create() {
        let from = notify_event(EventKind::Modify(ModifyKind::Name(RenameMode::From)), &["/a"]);
        let to = notify_event(EventKind::Modify(ModifyKind::Name(RenameMode::To)), &["/b"]);

        assert_eq!(WatchEvent::from_notify(from)[0].op, Op::RENAME);
        assert_eq!(WatchEvent::from_notify(to)[0].op, Op::CREATE);
    }

    #[test]
    fn rename_with_both_ends_splits_into_two_events() {
        let event = notify_event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["/dir/old.toml", "/dir/new.toml"],
        );

        assert_eq!(
            WatchEvent::from_notify(event),
            vec![
                WatchEvent::new("/dir/old.toml", Op::RENAME),
                WatchEvent::new("/dir/new.toml", Op::CREATE),
            ]
        );
    }

    #[test]
    fn access_events_are_dropped() {
        let event = notify_event(EventKind::Access(AccessKind::Read), &["/a"]);
        assert!(WatchEvent::from_notify(event).is_empty());
    }

    #[test]
    fn op_display_lists_flag_names() {
        assert_eq!(Op::WRITE.to_string(), "WRITE");
        assert_eq!(Op::RENAME_OR_REMOVE.to_string(), "REMOVE|RENAME");
    }
}

mod classification {
    use super::*;

    #[test]
    fn write_to_config_file_reloads() {
        let (_dir, path, mut session) = session_with_file("a = 1\n");

        let action = session.classify(&WatchEvent::new(&path, Op::WRITE));

        assert_eq!(action, Some(Action::Reload));
    }

    #[test]
    fn create_of_config_file_reloads() {
        let (_dir, path, mut session) = session_with_file("a = 1\n");

        let action = session.classify(&WatchEvent::new(&path, Op::CREATE));

        assert_eq!(action, Some(Action::Reload));
    }

    #[test]
    fn rename_or_remove_of_config_file_recovers() {
        let (_dir, path, mut session) = session_with_file("a = 1\n");

        assert_eq!(
            session.classify(&WatchEvent::new(&path, Op::RENAME)),
            Some(Action::Recover)
        );
        assert_eq!(
            session.classify(&WatchEvent::new(&path, Op::REMOVE)),
            Some(Action::Recover)
        );
    }

    #[test]
    fn events_for_other_files_are_ignored() {
        let (dir, _path, mut session) = session_with_file("a = 1\n");
        let other = dir.path().join("other.toml");

        assert_eq!(session.classify(&WatchEvent::new(&other, Op::WRITE)), None);
        assert_eq!(session.classify(&WatchEvent::new(&other, Op::REMOVE)), None);
    }

    #[test]
    fn chmod_of_config_file_is_ignored() {
        let (_dir, path, mut session) = session_with_file("a = 1\n");

        assert_eq!(session.classify(&WatchEvent::new(&path, Op::CHMOD)), None);
    }

    #[test]
    fn uncleaned_event_path_still_matches() {
        let (dir, _path, mut session) = session_with_file("a = 1\n");
        let dotted = dir.path().join(".").join("config.toml");

        assert_eq!(
            session.classify(&WatchEvent::new(dotted, Op::WRITE)),
            Some(Action::Reload)
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlink_target_change_reloads_on_any_event() {
        use std::os::unix::fs::symlink;

        let dir = TempDir::new().unwrap();
        let first = dir.path().join("first.toml");
        let second = dir.path().join("second.toml");
        let link = dir.path().join("config.toml");
        fs::write(&first, "a = 1\n").unwrap();
        fs::write(&second, "a = 2\n").unwrap();
        symlink(&first, &link).unwrap();

        let mut session = WatchSession::new(&link).unwrap();
        let unrelated = WatchEvent::new(dir.path().join("unrelated"), Op::CREATE);
        assert_eq!(session.classify(&unrelated), None);

        fs::remove_file(&link).unwrap();
        symlink(&second, &link).unwrap();

        assert_eq!(session.classify(&unrelated), Some(Action::Reload));
        assert_eq!(
            session.real_config_file(),
            Some(fs::canonicalize(&second).unwrap().as_path())
        );
        assert_eq!(session.classify(&unrelated), None);
    }

    #[test]
    fn recovered_contents_are_recognized_until_forgotten() {
        let (_dir, path, mut session) = session_with_file("a = 1\n");

        let initial = session.read_digest();
        assert!(!session.is_own_write(initial));

        session.remember_own_write(initial);
        assert!(session.is_own_write(session.read_digest()));

        fs::write(&path, "a = 2\n").unwrap();
        assert!(!session.is_own_write(session.read_digest()));

        fs::write(&path, "a = 1\n").unwrap();
        session.forget_own_write();
        assert!(!session.is_own_write(session.read_digest()));
    }

    #[test]
    fn missing_file_is_never_an_own_write() {
        let (_dir, path, mut session) = session_with_file("a = 1\n");
        session.remember_own_write(session.read_digest());
        fs::remove_file(&path).unwrap();

        let digest = session.read_digest();

        assert_eq!(digest, None);
        assert!(!session.is_own_write(digest));
    }

    #[test]
    fn only_config_path_events_are_relevant() {
        let (dir, path, session) = session_with_file("a = 1\n");

        assert!(session.is_relevant(&WatchEvent::new(&path, Op::WRITE)));
        assert!(session.is_relevant(&WatchEvent::new(&path, Op::CHMOD)));
        assert!(!session.is_relevant(&WatchEvent::new(dir.path().join("app.log"), Op::WRITE)));
    }

    #[cfg(unix)]
    #[test]
    fn any_event_is_relevant_after_symlink_swap() {
        use std::os::unix::fs::symlink;

        let dir = TempDir::new().unwrap();
        let first = dir.path().join("first.toml");
        let second = dir.path().join("second.toml");
        let link = dir.path().join("config.toml");
        fs::write(&first, "a = 1\n").unwrap();
        fs::write(&second, "a = 2\n").unwrap();
        symlink(&first, &link).unwrap();

        let session = WatchSession::new(&link).unwrap();
        let unrelated = WatchEvent::new(dir.path().join("app.log"), Op::WRITE);
        assert!(!session.is_relevant(&unrelated));

        fs::remove_file(&link).unwrap();
        symlink(&second, &link).unwrap();

        assert!(session.is_relevant(&unrelated));
    }
}
