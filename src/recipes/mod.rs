//! Library recipes.
//!
//! A recipe knows one library's download location, the directory its
//! archive unpacks to and the driver parameters that build it. Planning is
//! pure: [`Library::plan`] only describes the run, `ops::build` executes it.

pub mod boost;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use semver::Version;

use crate::builder::PrefixFlag;
use crate::core::error::BuildError;
use crate::core::state::LibraryPrefixes;

pub use boost::BoostBuild;

/// The libraries depbuild knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Library {
    YamlCpp,
    Sqlpp11,
    Date,
    Sqlpp11Mysql,
    Catch2,
    Boost,
    CyrusSasl,
    Qt5Base,
}

impl Library {
    /// Every library, in the order a full run builds them.
    pub const ALL: [Library; 8] = [
        Library::YamlCpp,
        Library::Sqlpp11,
        Library::Date,
        Library::Sqlpp11Mysql,
        Library::Catch2,
        Library::Boost,
        Library::CyrusSasl,
        Library::Qt5Base,
    ];

    /// Stable key used on the command line and in the state file.
    pub const fn key(&self) -> &'static str {
        match self {
            Library::YamlCpp => "yaml-cpp",
            Library::Sqlpp11 => "sqlpp11",
            Library::Date => "date",
            Library::Sqlpp11Mysql => "sqlpp11-mysql",
            Library::Catch2 => "catch2",
            Library::Boost => "boost",
            Library::CyrusSasl => "cyrus-sasl",
            Library::Qt5Base => "qt5base",
        }
    }

    pub const fn default_version(&self) -> &'static str {
        match self {
            Library::YamlCpp => "0.6.3",
            Library::Sqlpp11 => "0.60",
            Library::Date => "3.0.0",
            Library::Sqlpp11Mysql => "0.29",
            Library::Catch2 => "2.13.4",
            Library::Boost => "1.76.0",
            Library::CyrusSasl => "2.1.27",
            Library::Qt5Base => "5.15.2",
        }
    }

    /// Local archive file stem.
    pub const fn label(&self) -> &'static str {
        match self {
            Library::YamlCpp => "yaml_cpp",
            Library::Sqlpp11 => "sqlpp11",
            Library::Date => "date",
            Library::Sqlpp11Mysql => "sqlpp11_connector_mysql",
            Library::Catch2 => "catch2",
            Library::Boost => "boost",
            Library::CyrusSasl => "cyrus_sasl",
            Library::Qt5Base => "qt5base",
        }
    }

    /// Libraries whose prefixes feed into this one's configuration.
    pub const fn dependencies(&self) -> &'static [Library] {
        match self {
            Library::Sqlpp11Mysql => &[Library::Sqlpp11, Library::Date],
            _ => &[],
        }
    }

    /// Describe how to fetch and build `version` of this library.
    pub fn plan(&self, version: &str, deps: &DependencyPrefixes) -> Result<RecipePlan, BuildError> {
        let v = version;
        let (url, source_dir, driver) = match self {
            Library::YamlCpp => (
                format!("https://github.com/jbeder/yaml-cpp/archive/yaml-cpp-{}.tar.gz", v),
                format!("yaml-cpp-yaml-cpp-{}", v),
                Driver::cmake([("YAML_BUILD_SHARED_LIBS", "ON"), ("YAML_CPP_BUILD_TESTS", "OFF")]),
            ),
            Library::Sqlpp11 => (
                format!("https://github.com/rbock/sqlpp11/archive/{}.tar.gz", v),
                format!("sqlpp11-{}", v),
                Driver::cmake([("BUILD_TESTING", "OFF")]),
            ),
            Library::Date => (
                format!("https://github.com/HowardHinnant/date/archive/v{}.tar.gz", v),
                format!("date-{}", v),
                Driver::CMake { defines: Vec::new() },
            ),
            Library::Sqlpp11Mysql => {
                let sqlpp11 = deps.get(Library::Sqlpp11);
                let date = deps.get(Library::Date);
                (
                    format!("https://github.com/rbock/sqlpp11-connector-mysql/archive/{}.tar.gz", v),
                    format!("sqlpp11-connector-mysql-{}", v),
                    Driver::cmake([
                        ("ENABLE_TESTS", "OFF".to_string()),
                        ("USE_MARIADB", "TRUE".to_string()),
                        ("SQLPP11_INCLUDE_DIR", include_dir(sqlpp11)),
                        ("DATE_INCLUDE_DIR", include_dir(date)),
                        (
                            "CMAKE_PREFIX_PATH",
                            format!("{};{}", sqlpp11.display(), date.display()),
                        ),
                    ]),
                )
            }
            Library::Catch2 => (
                format!("https://github.com/catchorg/Catch2/archive/v{}.tar.gz", v),
                format!("Catch2-{}", v),
                Driver::cmake([("BUILD_TESTING", "OFF")]),
            ),
            Library::Boost => {
                let parsed = parse_triple(*self, v)?;
                let (major, minor, patch) = (parsed.major, parsed.minor, parsed.patch);
                (
                    format!(
                        "https://boostorg.jfrog.io/artifactory/main/release/{}.{}.{}/source/boost_{}_{}_{}.tar.bz2",
                        major, minor, patch, major, minor, patch
                    ),
                    format!("boost_{}_{}_{}", major, minor, patch),
                    Driver::Boost(BoostBuild::default()),
                )
            }
            Library::CyrusSasl => (
                format!(
                    "https://github.com/cyrusimap/cyrus-sasl/releases/download/cyrus-sasl-{v}/cyrus-sasl-{v}.tar.gz",
                    v = v
                ),
                format!("cyrus-sasl-{}", v),
                Driver::make(["--disable-otp", "--with-dblib=gdbm"], PrefixFlag::Assign("--prefix=")),
            ),
            Library::Qt5Base => {
                let parsed = parse_triple(*self, v)?;
                (
                    format!(
                        "http://download.qt.io/official_releases/qt/{}.{}/{v}/submodules/qtbase-everywhere-src-{v}.tar.xz",
                        parsed.major,
                        parsed.minor,
                        v = v
                    ),
                    format!("qtbase-everywhere-src-{}", v),
                    Driver::make(
                        [
                            "-platform", "linux-g++", "-c++std", "c++17", "-opensource",
                            "-confirm-license", "-no-opengl", "-nomake", "examples", "-nomake",
                            "tests",
                        ],
                        PrefixFlag::Separate("-prefix"),
                    ),
                )
            }
        };

        Ok(RecipePlan {
            library: *self,
            version: version.to_string(),
            url,
            label: self.label(),
            source_dir: PathBuf::from(source_dir),
            driver,
        })
    }
}

impl fmt::Display for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Library {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Library::ALL
            .into_iter()
            .find(|lib| lib.key() == s)
            .ok_or_else(|| BuildError::UnknownLibrary(s.to_string()))
    }
}

/// A `major.minor.patch` version, or `InvalidVersion`.
fn parse_triple(library: Library, version: &str) -> Result<Version, BuildError> {
    let invalid = || BuildError::InvalidVersion {
        library: library.key().to_string(),
        version: version.to_string(),
    };
    let parsed = Version::parse(version).map_err(|_| invalid())?;
    if !parsed.pre.is_empty() || !parsed.build.is_empty() {
        return Err(invalid());
    }
    Ok(parsed)
}

fn include_dir(prefix: &Path) -> String {
    prefix.join("include").display().to_string()
}

/// Build-system specific parameters of a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Driver {
    /// CMake with the Ninja generator and extra `-D` cache entries.
    CMake { defines: Vec<(String, String)> },
    /// `configure` + make.
    Make {
        configure_args: Vec<String>,
        prefix_flag: PrefixFlag,
    },
    /// bootstrap + b2.
    Boost(BoostBuild),
}

impl Driver {
    fn cmake<K: Into<String>, V: Into<String>>(defines: impl IntoIterator<Item = (K, V)>) -> Self {
        Driver::CMake {
            defines: defines
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    fn make<'s>(args: impl IntoIterator<Item = &'s str>, prefix_flag: PrefixFlag) -> Self {
        Driver::Make {
            configure_args: args.into_iter().map(str::to_string).collect(),
            prefix_flag,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Driver::CMake { .. } => "cmake",
            Driver::Make { .. } => "make",
            Driver::Boost(_) => "b2",
        }
    }

    /// b2 builds inside the source tree.
    pub fn takes_build_dir(&self) -> bool {
        !matches!(self, Driver::Boost(_))
    }

    /// Only CMake receives the build variant; b2 is pinned to `variant=release`.
    pub fn takes_variant(&self) -> bool {
        matches!(self, Driver::CMake { .. })
    }
}

/// Everything needed to run one recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipePlan {
    pub library: Library,
    pub version: String,
    pub url: String,
    pub label: &'static str,
    /// Directory the archive unpacks to, relative to the working directory
    pub source_dir: PathBuf,
    pub driver: Driver,
}

/// Installed prefixes of a recipe's dependencies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyPrefixes {
    prefixes: BTreeMap<Library, PathBuf>,
}

impl DependencyPrefixes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up every dependency of `library` among recorded prefixes.
    ///
    /// Unbuilt dependencies resolve to an empty path.
    pub fn resolve(library: Library, recorded: &LibraryPrefixes) -> Self {
        let prefixes = library
            .dependencies()
            .iter()
            .map(|dep| (*dep, recorded.lookup(dep.key()).to_path_buf()))
            .collect();
        DependencyPrefixes { prefixes }
    }

    pub fn insert(&mut self, library: Library, prefix: impl Into<PathBuf>) {
        self.prefixes.insert(library, prefix.into());
    }

    pub fn get(&self, library: Library) -> &Path {
        self.prefixes
            .get(&library)
            .map(PathBuf::as_path)
            .unwrap_or_else(|| Path::new(""))
    }

    /// Dependencies that resolved to an empty path.
    pub fn missing(&self) -> impl Iterator<Item = Library> + '_ {
        self.prefixes
            .iter()
            .filter(|(_, path)| path.as_os_str().is_empty())
            .map(|(lib, _)| *lib)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defines(plan: &RecipePlan) -> &[(String, String)] {
        match &plan.driver {
            Driver::CMake { defines } => defines,
            other => panic!("expected a CMake driver, got {:?}", other),
        }
    }

    fn has_define(plan: &RecipePlan, key: &str, value: &str) -> bool {
        defines(plan).iter().any(|(k, v)| k == key && v == value)
    }

    #[test]
    fn test_keys_round_trip() {
        for lib in Library::ALL {
            assert_eq!(lib.key().parse::<Library>().unwrap(), lib);
        }
        assert!(matches!(
            "openssl".parse::<Library>(),
            Err(BuildError::UnknownLibrary(ref k)) if k == "openssl"
        ));
    }

    #[test]
    fn test_yaml_cpp_plan() {
        let plan = Library::YamlCpp.plan("0.6.3", &DependencyPrefixes::new()).unwrap();

        assert_eq!(plan.url, "https://github.com/jbeder/yaml-cpp/archive/yaml-cpp-0.6.3.tar.gz");
        assert_eq!(plan.source_dir, Path::new("yaml-cpp-yaml-cpp-0.6.3"));
        assert_eq!(plan.label, "yaml_cpp");
        assert!(has_define(&plan, "YAML_BUILD_SHARED_LIBS", "ON"));
        assert!(has_define(&plan, "YAML_CPP_BUILD_TESTS", "OFF"));
    }

    #[test]
    fn test_boost_plan() {
        let plan = Library::Boost.plan("1.76.0", &DependencyPrefixes::new()).unwrap();

        assert!(plan.url.contains("/release/1.76.0/source/"));
        assert!(plan.url.ends_with("boost_1_76_0.tar.bz2"));
        assert_eq!(plan.source_dir, Path::new("boost_1_76_0"));
        assert_eq!(plan.driver, Driver::Boost(BoostBuild::default()));
    }

    #[test]
    fn test_invalid_versions() {
        for (lib, version) in [
            (Library::Boost, "1.76"),
            (Library::Qt5Base, "latest"),
            (Library::Boost, "1.76.0-beta1"),
            (Library::Qt5Base, "5.15.2+lts"),
        ] {
            match lib.plan(version, &DependencyPrefixes::new()) {
                Err(BuildError::InvalidVersion { library, version: v }) => {
                    assert_eq!(library, lib.key());
                    assert_eq!(v, version);
                }
                other => panic!("expected InvalidVersion, got {:?}", other),
            }
        }
        // Versions of other recipes are used verbatim.
        assert!(Library::Sqlpp11.plan("0.60", &DependencyPrefixes::new()).is_ok());
    }

    #[test]
    fn test_driver_capabilities() {
        let plan = |lib: Library| lib.plan(lib.default_version(), &DependencyPrefixes::new()).unwrap();

        assert!(plan(Library::Date).driver.takes_build_dir());
        assert!(plan(Library::Date).driver.takes_variant());
        assert!(plan(Library::CyrusSasl).driver.takes_build_dir());
        assert!(!plan(Library::CyrusSasl).driver.takes_variant());
        assert!(!plan(Library::Boost).driver.takes_build_dir());
        assert!(!plan(Library::Boost).driver.takes_variant());
    }

    #[test]
    fn test_qt_plan() {
        let plan = Library::Qt5Base.plan("5.15.2", &DependencyPrefixes::new()).unwrap();

        assert_eq!(
            plan.url,
            "http://download.qt.io/official_releases/qt/5.15/5.15.2/submodules/qtbase-everywhere-src-5.15.2.tar.xz"
        );
        match &plan.driver {
            Driver::Make { configure_args, prefix_flag } => {
                assert_eq!(*prefix_flag, PrefixFlag::Separate("-prefix"));
                assert_eq!(configure_args[..2], ["-platform", "linux-g++"]);
                assert!(configure_args.ends_with(&["-nomake".to_string(), "tests".to_string()]));
            }
            other => panic!("unexpected driver {:?}", other),
        }
    }

    #[test]
    fn test_cyrus_sasl_plan() {
        let plan = Library::CyrusSasl.plan("2.1.27", &DependencyPrefixes::new()).unwrap();
        assert_eq!(
            plan.url,
            "https://github.com/cyrusimap/cyrus-sasl/releases/download/cyrus-sasl-2.1.27/cyrus-sasl-2.1.27.tar.gz"
        );
        assert_eq!(
            plan.driver,
            Driver::Make {
                configure_args: vec!["--disable-otp".to_string(), "--with-dblib=gdbm".to_string()],
                prefix_flag: PrefixFlag::Assign("--prefix="),
            }
        );
    }

    #[test]
    fn test_mysql_connector_uses_dependency_prefixes() {
        assert_eq!(
            Library::Sqlpp11Mysql.dependencies(),
            &[Library::Sqlpp11, Library::Date]
        );

        let mut recorded = LibraryPrefixes::new();
        recorded.record("sqlpp11", PathBuf::from("/w/sqlpp11-0.60/prefix")).unwrap();
        recorded.record("date", PathBuf::from("/w/date-3.0.0/prefix")).unwrap();

        let deps = DependencyPrefixes::resolve(Library::Sqlpp11Mysql, &recorded);
        assert_eq!(deps.missing().count(), 0);

        let plan = Library::Sqlpp11Mysql.plan("0.29", &deps).unwrap();
        assert_eq!(plan.label, "sqlpp11_connector_mysql");
        assert!(has_define(&plan, "USE_MARIADB", "TRUE"));
        assert!(has_define(
            &plan,
            "CMAKE_PREFIX_PATH",
            "/w/sqlpp11-0.60/prefix;/w/date-3.0.0/prefix"
        ));
        assert!(has_define(
            &plan,
            "SQLPP11_INCLUDE_DIR",
            &Path::new("/w/sqlpp11-0.60/prefix/include").display().to_string()
        ));
    }

    #[test]
    fn test_unbuilt_dependencies_are_empty() {
        let deps = DependencyPrefixes::resolve(Library::Sqlpp11Mysql, &LibraryPrefixes::new());
        assert_eq!(deps.get(Library::Date), Path::new(""));
        assert_eq!(
            deps.missing().collect::<Vec<_>>(),
            vec![Library::Sqlpp11, Library::Date]
        );
        assert!(DependencyPrefixes::resolve(Library::Boost, &LibraryPrefixes::new())
            .missing()
            .next()
            .is_none());
    }

    #[test]
    fn test_catch2_label() {
        let plan = Library::Catch2.plan("2.13.4", &DependencyPrefixes::new()).unwrap();
        assert_eq!(plan.label, "catch2");
        assert_eq!(plan.source_dir, Path::new("Catch2-2.13.4"));
    }
}
