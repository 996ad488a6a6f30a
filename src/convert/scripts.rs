// src/convert/scripts.rs

//! Shell snippets for the maintainer scripts and `fixperms`
//!
//! `$DEST` is the staging tree while `debian/rules` runs; `$BASEDIR` is the
//! install root when the package is configured or removed. `$ZONEINST` is
//! set to `1` when installing into a non-global zone.

use crate::error::{Error, Result};
use crate::manifest::Action;

/// Hardlinks `sunwcs` materialises by copying instead of linking
pub const SUNWCS_HARDLINK_SKIP: &[&str] = &[
    "usr/bin/ln",
    "usr/bin/mv",
    "usr/bin/ksh",
    "usr/bin/ksh93",
    "usr/sbin/rem_drv",
    "usr/sbin/update_drv",
];

/// Copies `sunwcs` performs in place of the hardlinks above
const SUNWCS_COPIES: &[(&str, &str)] = &[
    ("usr/bin/cp", "usr/bin/ln"),
    ("usr/bin/cp", "usr/bin/mv"),
    ("usr/lib/isaexec", "usr/bin/ksh"),
    ("usr/lib/isaexec", "usr/bin/ksh93"),
    ("usr/lib/isaexec", "usr/sbin/rem_drv"),
    ("usr/lib/isaexec", "usr/sbin/update_drv"),
];

/// Alternatives priority given to mediated links
pub const MEDIATED_LINK_PRIORITY: u32 = 99;

/// Lines collected for each generated script
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scripts {
    pub postinst: Vec<String>,
    pub preinst: Vec<String>,
    pub prerm: Vec<String>,
    pub fixperms: Vec<String>,
}

/// Directory part of a manifest path (`""` at top level)
pub fn dirname(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Final component of a manifest path
pub fn basename(path: &str) -> &str {
    path.rsplit_once('/').map(|(_, base)| base).unwrap_or(path)
}

impl Scripts {
    /// Permission fixes for a `dir` action
    pub fn add_dir(&mut self, path: &str, mode: &str, owner: &str, group: &str) {
        self.fixperms.push(format!("chmod {} $DEST/{}", mode, path));
        self.fixperms
            .push(format!("chown {}:{} $DEST/{}", owner, group, path));
    }

    /// Existence check and permission fixes for a staged file
    pub fn add_file(&mut self, path: &str, mode: &str, owner: &str, group: &str) {
        self.fixperms.push(format!(
            "test -f \"$DEST/{p}\" || echo '== Missing: {p}'\n\
             test -f \"$DEST/{p}\" || exit 1\n\
             chmod {mode} \"$DEST/{p}\"\n\
             chown {owner}:{group} \"$DEST/{p}\"",
            p = path,
            mode = mode,
            owner = owner,
            group = group,
        ));
    }

    /// Snippets for the `preserve` attribute of a file
    ///
    /// The staged file is moved aside and put in place by postinst so an
    /// existing, locally modified copy survives the upgrade.
    pub fn add_preserve(&mut self, path: &str, preserve: &str, package: &str) {
        let p = path;
        match preserve {
            "renamenew" => {
                self.fixperms.push(format!("mv $DEST/{p} $DEST/{p}.new"));
                self.postinst.push(format!(
                    "([ -f $BASEDIR/{p} ] || mv -f $BASEDIR/{p}.new $BASEDIR/{p})"
                ));
            }
            "renameold" => {
                self.fixperms.push(format!("mv $DEST/{p} $DEST/{p}.{package}"));
                self.postinst.push(format!(
                    "([ -f $BASEDIR/{p} ] && cp -f $BASEDIR/{p} $BASEDIR/{p}.old )\n\
                     \t([ -f $BASEDIR/{p}.{package} ] && mv -f $BASEDIR/{p}.{package} $BASEDIR/{p} )"
                ));
            }
            "legacy" => {
                self.fixperms.push(format!("mv $DEST/{p} $DEST/{p}.{package}"));
                self.postinst.push(format!(
                    "([ -f $BASEDIR/{p} ] || rm -f $BASEDIR/{p}.{package} )\n\
                     \t([ -f $BASEDIR/{p} ] && mv -f $BASEDIR/{p} $BASEDIR/{p}.legacy )\n\
                     \t([ -f $BASEDIR/{p}.{package} ] && mv -f $BASEDIR/{p}.{package} $BASEDIR/{p} )"
                ));
            }
            "true" => {
                self.fixperms.push(format!("mv $DEST/{p} $DEST/{p}.{package}"));
                self.postinst.push(format!(
                    "([ -f $BASEDIR/{p}.saved ] && mv -f $BASEDIR/{p}.saved $BASEDIR/{p} )\n\
                     \t([ -f $BASEDIR/{p} ] || mv -f $BASEDIR/{p}.{package} $BASEDIR/{p} )\n\
                     \t([ -f $BASEDIR/{p} ] && rm -f $BASEDIR/{p}.{package})"
                ));
                self.prerm.push(format!(
                    "([ -f $BASEDIR/{p} ] && mv -f $BASEDIR/{p} $BASEDIR/{p}.saved)"
                ));
            }
            _ => {}
        }
    }

    /// Remove a global-zone-only file when installing into a zone
    pub fn add_global_zone_file(&mut self, path: &str) {
        self.postinst.push(format!(
            "[ \"$ZONEINST\" = \"1\" ] && ([ -f $BASEDIR/{p} ] && rm -f $BASEDIR/{p})",
            p = path
        ));
    }

    /// Restart an SMF service after configuration
    pub fn add_service_restart(&mut self, fmri: &str) {
        self.postinst.push(format!(
            "[ \"${{BASEDIR}}\" = \"/\" ] && ( /usr/sbin/svcadm restart {} || true )",
            fmri
        ));
    }

    /// `sunwcs` copies made at configure time
    pub fn add_sunwcs_postinst_copies(&mut self) {
        let lines: Vec<String> = SUNWCS_COPIES
            .iter()
            .map(|(from, to)| format!("cp -f $BASEDIR/{} $BASEDIR/{}", from, to))
            .collect();
        self.postinst.push(lines.join("\n\t"));
    }

    /// `sunwcs` copies made in the staging tree
    pub fn add_sunwcs_fixperms_copies(&mut self) {
        let lines: Vec<String> = SUNWCS_COPIES
            .iter()
            .map(|(from, to)| {
                format!("mkdir -p $DEST/usr/bin && cp -f $DEST/{} $DEST/{}", from, to)
            })
            .collect();
        self.fixperms.push(lines.join("\n"));
    }

    /// Hardlink creation and removal
    pub fn add_hardlink(&mut self, path: &str, target: &str, global_zone_only: bool) {
        let dir = dirname(path);
        let base = basename(path);
        if global_zone_only {
            self.postinst.push(format!(
                "[ \"$ZONEINST\" = \"1\" ] || (mkdir -p $BASEDIR/{dir} && cd $BASEDIR/{dir} && ln -f {target} {base})"
            ));
            self.prerm
                .push(format!("[ \"$ZONEINST\" = \"1\" ] || rm -f $BASEDIR/{path}"));
        } else {
            self.postinst.push(format!(
                "mkdir -p $BASEDIR/{dir} && (cd $BASEDIR/{dir} && ln -f {target} {base})"
            ));
            self.prerm.push(format!("rm -f $BASEDIR/{path}"));
        }
    }

    /// Driver registration, clone permissions and devlink entries
    pub fn add_driver(&mut self, driver: &DriverSpec) {
        let name = &driver.name;
        self.postinst.push(format!(
            "[ \"$ZONEINST\" = \"1\" ] || (grep -c \"^{name} \" $BASEDIR/etc/name_to_major >/dev/null || ( add_drv -n  $BASEDIR_OPT {} {name} ) )",
            driver.options
        ));
        self.prerm.push(format!(
            "[ \"$ZONEINST\" = \"1\" ] || ( rem_drv -n $BASEDIR_OPT {name} )"
        ));

        for perm in &driver.clone_perms {
            self.postinst.push(format!(
                "[ \"$ZONEINST\" = \"1\" ] || (grep -c \"^clone:{perm}\" $BASEDIR/etc/minor_perm >/dev/null || update_drv -n  -a $BASEDIR_OPT {} -m '{perm}' clone)",
                driver.clone_options
            ));
            self.prerm.push(format!(
                "[ \"$ZONEINST\" = \"1\" ] || (grep -c \"^clone:{perm}\" $BASEDIR/etc/minor_perm >/dev/null && update_drv -n  -d $BASEDIR_OPT {} -m '{perm}' clone)",
                driver.clone_options
            ));
        }

        if let Some(devlink) = &driver.devlink
            && let Some(key) = devlink.split_whitespace().next()
        {
            self.postinst.push(format!(
                "[ \"$ZONEINST\" = \"1\" ] || (grep -c \"^{key}\" $BASEDIR/etc/devlink.tab >/dev/null || (echo \"{devlink}\" >> $BASEDIR/etc/devlink.tab))"
            ));
            self.prerm.push(format!(
                "[ \"$ZONEINST\" = \"1\" ] || ( cat $BASEDIR/etc/devlink.tab | sed -e '/^{key}/d' > $BASEDIR/etc/devlink.tab.new; mv $BASEDIR/etc/devlink.tab.new $BASEDIR/etc/devlink.tab )"
            ));
        }
    }

    /// Blank separators after the driver block
    pub fn end_driver_block(&mut self) {
        if !self.postinst.is_empty() {
            self.postinst.push(String::new());
        }
        if !self.prerm.is_empty() {
            self.prerm.push(String::new());
        }
    }

    /// Group creation
    pub fn add_group(&mut self, name: &str, gid: Option<&str>) {
        let gid = gid.map(|g| format!(" -g {}", g)).unwrap_or_default();
        self.postinst.push(format!(
            "\n\tif ! getent group {name} >/dev/null 2>&1 ; then\n\t\tgroupadd{gid} {name}\n\tfi"
        ));
    }

    /// User creation
    pub fn add_user(&mut self, user: &UserSpec<'_>) {
        let mut opts = String::new();
        if let Some(gcos) = user.gcos {
            opts.push_str(&format!(" -c \"{}\"", gcos));
        }
        if let Some(shell) = user.shell {
            opts.push_str(&format!(" -s {}", shell));
        }
        if let Some(uid) = user.uid {
            opts.push_str(&format!(" -u {}", uid));
        }
        if let Some(group) = user.group {
            opts.push_str(&format!(" -g {}", group));
        }
        opts.push_str(&format!(" -m {}", user.name));

        self.postinst.push(format!(
            "\n\tif ! getent passwd {} >/dev/null 2>&1 ; then\n\t\tuseradd{}\n\tfi",
            user.name, opts
        ));
    }
}

/// Options derived from a `driver` action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverSpec {
    pub name: String,
    /// Options for `add_drv`, each with a leading space
    pub options: String,
    /// Options for `update_drv` on the clone device
    pub clone_options: String,
    pub clone_perms: Vec<String>,
    /// devlink.tab entry with `\t` expanded
    pub devlink: Option<String>,
}

impl DriverSpec {
    /// Build `add_drv` options from a driver action
    ///
    /// Order is `-P privs`, `-p policy`, `-c class`, `-i aliases`,
    /// `-m perms`. The clone device gets the options before `-c` unless the
    /// driver has no `perms`, in which case it gets all of them.
    pub fn from_action(action: &Action) -> Result<Self> {
        let name = action.require("name")?.to_string();
        let mut options = String::new();

        if let Some(privs) = action.attr_first("privs") {
            options.push_str(&format!(" -P {}", privs));
        }
        if let Some(policy) = action.attr("policy") {
            options.push_str(&format!(" -p '{}'", policy.join(", ").replace('"', "")));
        }

        let mut clone_options = options.clone();

        if let Some(class) = action.attr("class") {
            options.push_str(&format!(" -c '{}'", class.join(" ")));
        }
        if let Some(alias) = action.attr("alias") {
            options.push_str(&format!(" -i '\"{}\"'", alias.join("\" \"")));
        }

        match action.attr("perms") {
            Some(perms) => {
                options.push_str(&format!(" -m '{}'", perms.join("','").replace('"', "'")));
            }
            None => clone_options = options.clone(),
        }

        let clone_perms = action
            .attr("clone_perms")
            .map(|perms| perms.values().iter().map(|p| p.replace('"', "")).collect())
            .unwrap_or_default();

        let devlink = action
            .attr_first("devlink")
            .map(|devlink| devlink.replace("\\t", "\t"));

        Ok(Self {
            name,
            options,
            clone_options,
            clone_perms,
            devlink,
        })
    }
}

/// Fields of a `user` action
#[derive(Debug, Clone, Copy)]
pub struct UserSpec<'a> {
    pub name: &'a str,
    pub uid: Option<&'a str>,
    pub group: Option<&'a str>,
    pub gcos: Option<&'a str>,
    pub shell: Option<&'a str>,
}

impl<'a> UserSpec<'a> {
    pub fn from_action(action: &'a Action) -> Result<Self> {
        Ok(Self {
            name: action.require("username")?,
            uid: action.attr_first("uid"),
            group: action.attr_first("group"),
            gcos: action.attr_first("gcos-field"),
            shell: action.attr_first("login-shell"),
        })
    }
}

/// Accumulates mediated links into one `update-alternatives` call
#[derive(Debug, Default)]
pub struct MediatorGroup {
    mediator: Option<String>,
    parts: Vec<String>,
}

impl MediatorGroup {
    /// Register a link's mediator, rejecting a second distinct mediator
    ///
    /// Returns true the first time a mediator is seen.
    pub fn register(&mut self, mediator: &str, package: &str) -> Result<bool> {
        match &self.mediator {
            Some(existing) if existing != mediator => Err(Error::Unsupported {
                package: package.to_string(),
                message: "multiple mediator groups per manifest not supported".to_string(),
            }),
            Some(_) => Ok(false),
            None => {
                self.mediator = Some(mediator.to_string());
                Ok(true)
            }
        }
    }

    /// Begin the `update-alternatives --install` call
    pub fn start(&mut self, scripts: &mut Scripts, mediator: &str, package: &str) {
        scripts.fixperms.push("mkdir -p $DEST/var/mediator".to_string());
        self.parts.push(format!(
            "(update-alternatives --quiet --install /var/mediator/{mediator} {mediator} /var/mediator/{package} {MEDIATED_LINK_PRIORITY}"
        ));
        scripts.prerm.push(format!(
            "if [ \"$1\" != \"upgrade\" ]; then\n\t(update-alternatives --quiet --remove {mediator} /var/mediator/{package})\nfi\n"
        ));
    }

    /// Add a link as a slave of the alternative
    pub fn add_slave(&mut self, path: &str, target: &str) {
        let dir = match dirname(path) {
            "" => ".",
            dir => dir,
        };
        self.parts.push(format!(
            "--slave /{} {} /{}/{}",
            path,
            path.replace('/', "-"),
            dir,
            target
        ));
    }

    /// Close the call and hand it to postinst
    pub fn finish(mut self, scripts: &mut Scripts) {
        if !self.parts.is_empty() {
            self.parts.push(")".to_string());
            scripts.postinst.push(self.parts.join(" "));
        }
    }
}

/// Symlink creation for an unmediated link
pub fn add_symlink(scripts: &mut Scripts, path: &str, target: &str, global_zone_only: bool) {
    let dir = match dirname(path) {
        "" => ".",
        dir => dir,
    };
    if global_zone_only {
        scripts.postinst.push(format!(
            "[ \"$ZONEINST\" = \"1\" ] || (mkdir -p $BASEDIR/{dir} && ln -f -s {target} $BASEDIR/{path})"
        ));
    } else {
        scripts.fixperms.push(format!(
            "mkdir -p $DEST/{dir} && ln -f -s {target} $DEST/{path}"
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirname_basename() {
        assert_eq!(dirname("usr/bin/ls"), "usr/bin");
        assert_eq!(basename("usr/bin/ls"), "ls");
        assert_eq!(dirname("motd"), "");
        assert_eq!(basename("motd"), "motd");
    }

    #[test]
    fn test_file_fixperms_block() {
        let mut scripts = Scripts::default();
        scripts.add_file("usr/bin/ls", "0555", "root", "bin");
        assert_eq!(
            scripts.fixperms[0],
            "test -f \"$DEST/usr/bin/ls\" || echo '== Missing: usr/bin/ls'\n\
             test -f \"$DEST/usr/bin/ls\" || exit 1\n\
             chmod 0555 \"$DEST/usr/bin/ls\"\n\
             chown root:bin \"$DEST/usr/bin/ls\""
        );
    }

    #[test]
    fn test_preserve_renamenew() {
        let mut scripts = Scripts::default();
        scripts.add_preserve("etc/foo.conf", "renamenew", "pkg");
        assert_eq!(scripts.fixperms, ["mv $DEST/etc/foo.conf $DEST/etc/foo.conf.new"]);
        assert_eq!(
            scripts.postinst,
            ["([ -f $BASEDIR/etc/foo.conf ] || mv -f $BASEDIR/etc/foo.conf.new $BASEDIR/etc/foo.conf)"]
        );
        assert!(scripts.prerm.is_empty());
    }

    #[test]
    fn test_preserve_true_saves_on_removal() {
        let mut scripts = Scripts::default();
        scripts.add_preserve("etc/passwd", "true", "sunwcs");
        assert_eq!(scripts.fixperms, ["mv $DEST/etc/passwd $DEST/etc/passwd.sunwcs"]);
        assert!(scripts.postinst[0].contains("mv -f $BASEDIR/etc/passwd.saved $BASEDIR/etc/passwd"));
        assert_eq!(
            scripts.prerm,
            ["([ -f $BASEDIR/etc/passwd ] && mv -f $BASEDIR/etc/passwd $BASEDIR/etc/passwd.saved)"]
        );
    }

    #[test]
    fn test_preserve_legacy_restores_package_copy() {
        let mut scripts = Scripts::default();
        scripts.add_preserve("etc/inittab", "legacy", "sunwcs");
        let lines: Vec<&str> = scripts.postinst[0].split("\n\t").collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[2],
            "([ -f $BASEDIR/etc/inittab.sunwcs ] && mv -f $BASEDIR/etc/inittab.sunwcs $BASEDIR/etc/inittab )"
        );
    }

    #[test]
    fn test_preserve_renameold() {
        let mut scripts = Scripts::default();
        scripts.add_preserve("etc/security/policy.conf", "renameold", "system-security");
        assert_eq!(
            scripts.fixperms,
            ["mv $DEST/etc/security/policy.conf $DEST/etc/security/policy.conf.system-security"]
        );
        assert_eq!(
            scripts.postinst,
            ["([ -f $BASEDIR/etc/security/policy.conf ] && cp -f $BASEDIR/etc/security/policy.conf $BASEDIR/etc/security/policy.conf.old )\n\
              \t([ -f $BASEDIR/etc/security/policy.conf.system-security ] && mv -f $BASEDIR/etc/security/policy.conf.system-security $BASEDIR/etc/security/policy.conf )"]
        );
        assert!(scripts.prerm.is_empty());
    }

    #[test]
    fn test_global_zone_file_removed_in_zones() {
        let mut scripts = Scripts::default();
        scripts.add_global_zone_file("kernel/drv/zfs.conf");
        assert_eq!(
            scripts.postinst,
            ["[ \"$ZONEINST\" = \"1\" ] && ([ -f $BASEDIR/kernel/drv/zfs.conf ] && rm -f $BASEDIR/kernel/drv/zfs.conf)"]
        );
        assert!(scripts.fixperms.is_empty());
        assert!(scripts.prerm.is_empty());
    }

    #[test]
    fn test_unknown_preserve_is_ignored() {
        let mut scripts = Scripts::default();
        scripts.add_preserve("etc/x", "abandon", "pkg");
        assert_eq!(scripts, Scripts::default());
    }

    #[test]
    fn test_hardlinks() {
        let mut scripts = Scripts::default();
        scripts.add_hardlink("usr/bin/i86/ls", "../ls", false);
        scripts.add_hardlink("usr/sbin/zoneadm", "../lib/isaexec", true);
        assert_eq!(
            scripts.postinst[0],
            "mkdir -p $BASEDIR/usr/bin/i86 && (cd $BASEDIR/usr/bin/i86 && ln -f ../ls ls)"
        );
        assert_eq!(scripts.prerm[0], "rm -f $BASEDIR/usr/bin/i86/ls");
        assert!(scripts.postinst[1].starts_with("[ \"$ZONEINST\" = \"1\" ] || (mkdir -p $BASEDIR/usr/sbin"));
        assert_eq!(scripts.prerm[1], "[ \"$ZONEINST\" = \"1\" ] || rm -f $BASEDIR/usr/sbin/zoneadm");
    }

    #[test]
    fn test_driver_options() {
        let action = Action::parse(
            r#"driver name=e1000g perms="* 0666 root sys" class=net alias=pci8086,1000 alias=pci8086,1001 privs=sys_net_config policy="read_priv_set=net_rawaccess""#,
            1,
        )
        .unwrap();
        let driver = DriverSpec::from_action(&action).unwrap();
        assert_eq!(
            driver.options,
            " -P sys_net_config -p 'read_priv_set=net_rawaccess' -c 'net' -i '\"pci8086,1000\" \"pci8086,1001\"' -m '* 0666 root sys'"
        );
        assert_eq!(driver.clone_options, " -P sys_net_config -p 'read_priv_set=net_rawaccess'");
    }

    #[test]
    fn test_driver_without_perms_uses_full_clone_options() {
        let action = Action::parse(
            "driver name=ipf clone_perms=\"ipf 0666 root sys\" class=misc",
            1,
        )
        .unwrap();
        let driver = DriverSpec::from_action(&action).unwrap();
        assert_eq!(driver.clone_options, driver.options);
        assert_eq!(driver.clone_perms, ["ipf 0666 root sys"]);

        let mut scripts = Scripts::default();
        scripts.add_driver(&driver);
        assert_eq!(
            scripts.postinst[0],
            "[ \"$ZONEINST\" = \"1\" ] || (grep -c \"^ipf \" $BASEDIR/etc/name_to_major >/dev/null || ( add_drv -n  $BASEDIR_OPT  -c 'misc' ipf ) )"
        );
        assert_eq!(scripts.prerm[0], "[ \"$ZONEINST\" = \"1\" ] || ( rem_drv -n $BASEDIR_OPT ipf )");
        assert!(scripts.postinst[1].contains("update_drv -n  -a $BASEDIR_OPT  -c 'misc' -m 'ipf 0666 root sys' clone"));
        assert!(scripts.prerm[1].contains("&& update_drv -n  -d"));
    }

    #[test]
    fn test_driver_devlink() {
        let action = Action::parse(r"driver name=sad devlink=type=ddi_pseudo;name=sad;minor=admin\tsad/admin", 1).unwrap();
        let driver = DriverSpec::from_action(&action).unwrap();
        assert_eq!(driver.devlink.as_deref(), Some("type=ddi_pseudo;name=sad;minor=admin\tsad/admin"));

        let mut scripts = Scripts::default();
        scripts.add_driver(&driver);
        assert!(scripts.postinst[1].contains("grep -c \"^type=ddi_pseudo;name=sad;minor=admin\" $BASEDIR/etc/devlink.tab"));
        assert!(scripts.prerm[1].contains("sed -e '/^type=ddi_pseudo;name=sad;minor=admin/d'"));
    }

    #[test]
    fn test_driver_requires_name() {
        let action = Action::parse("driver class=net", 1).unwrap();
        assert!(DriverSpec::from_action(&action).is_err());
    }

    #[test]
    fn test_end_driver_block_only_pads_nonempty() {
        let mut scripts = Scripts::default();
        scripts.postinst.push("x".to_string());
        scripts.end_driver_block();
        assert_eq!(scripts.postinst, ["x", ""]);
        assert!(scripts.prerm.is_empty());
    }

    #[test]
    fn test_mediator_group() {
        let mut scripts = Scripts::default();
        let mut group = MediatorGroup::default();
        assert!(group.register("java", "runtime-java").unwrap());
        group.start(&mut scripts, "java", "runtime-java");
        group.add_slave("usr/bin/java", "../jdk/bin/java");
        assert!(!group.register("java", "runtime-java").unwrap());
        group.add_slave("javac", "jdk/bin/javac");
        assert!(group.register("python", "runtime-java").is_err());
        group.finish(&mut scripts);

        assert_eq!(scripts.fixperms, ["mkdir -p $DEST/var/mediator"]);
        assert_eq!(
            scripts.postinst,
            ["(update-alternatives --quiet --install /var/mediator/java java /var/mediator/runtime-java 99 \
              --slave /usr/bin/java usr-bin-java /usr/bin/../jdk/bin/java \
              --slave /javac javac /./jdk/bin/javac )"]
        );
        assert!(scripts.prerm[0].contains("--remove java /var/mediator/runtime-java"));
    }

    #[test]
    fn test_plain_symlinks() {
        let mut scripts = Scripts::default();
        add_symlink(&mut scripts, "usr/bin/sh", "ksh93", false);
        add_symlink(&mut scripts, "etc/rc2", "../sbin/rc2", true);
        assert_eq!(scripts.fixperms, ["mkdir -p $DEST/usr/bin && ln -f -s ksh93 $DEST/usr/bin/sh"]);
        assert_eq!(
            scripts.postinst,
            ["[ \"$ZONEINST\" = \"1\" ] || (mkdir -p $BASEDIR/etc && ln -f -s ../sbin/rc2 $BASEDIR/etc/rc2)"]
        );
    }

    #[test]
    fn test_users_and_groups() {
        let mut scripts = Scripts::default();
        scripts.add_group("smmsp", Some("25"));
        let action = Action::parse(
            r#"user username=smmsp uid=25 group=smmsp gcos-field="SendMail Message Submission Program" login-shell=/bin/false"#,
            1,
        )
        .unwrap();
        scripts.add_user(&UserSpec::from_action(&action).unwrap());

        assert_eq!(
            scripts.postinst[0],
            "\n\tif ! getent group smmsp >/dev/null 2>&1 ; then\n\t\tgroupadd -g 25 smmsp\n\tfi"
        );
        assert_eq!(
            scripts.postinst[1],
            "\n\tif ! getent passwd smmsp >/dev/null 2>&1 ; then\n\t\tuseradd -c \"SendMail Message Submission Program\" -s /bin/false -u 25 -g smmsp -m smmsp\n\tfi"
        );
    }
}
