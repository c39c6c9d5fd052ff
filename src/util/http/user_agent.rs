use rand::Rng;

const CHROME_VERSIONS: [&str; 10] = [
    "133.0.6943.88", "132.0.6834.110", "131.0.6778.108", "130.0.6723.117", "129.0.6668.89",
    "128.0.6613.138", "127.0.6533.119", "126.0.6478.182", "125.0.6422.176", "124.0.6367.243",
];

const FIREFOX_VERSIONS: [&str; 8] = [
    "133.0", "132.0", "131.0", "130.0", "129.0", "128.0", "127.0", "126.0",
];

const EDGE_VERSIONS: [&str; 6] = [
    "133.0.3048.56", "132.0.2957.63", "131.0.2903.112", "130.0.2849.80", "129.0.2792.65",
    "128.0.2739.90",
];

const OS_STRINGS: [&str; 8] = [
    "Windows NT 10.0; Win64; x64",
    "Windows NT 10.0; Win64; x64",
    "Windows NT 10.0; Win64; x64",
    "Macintosh; Intel Mac OS X 10_15_7",
    "Macintosh; Intel Mac OS X 14_7_1",
    "Macintosh; Intel Mac OS X 15_2",
    "X11; Linux x86_64",
    "X11; Ubuntu; Linux x86_64",
];

fn gen_chrome_ua() -> String {
    let mut rng = rand::rng();
    let version = CHROME_VERSIONS[rng.random_range(0..CHROME_VERSIONS.len())];
    let os = OS_STRINGS[rng.random_range(0..OS_STRINGS.len())];

    format!(
        "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{} Safari/537.36",
        os, version
    )
}

fn gen_firefox_ua() -> String {
    let mut rng = rand::rng();
    let version = FIREFOX_VERSIONS[rng.random_range(0..FIREFOX_VERSIONS.len())];
    let os = OS_STRINGS[rng.random_range(0..OS_STRINGS.len())];

    format!(
        "Mozilla/5.0 ({}; rv:{}) Gecko/20100101 Firefox/{}",
        os, version, version
    )
}

fn gen_edge_ua() -> String {
    let mut rng = rand::rng();
    let version = EDGE_VERSIONS[rng.random_range(0..EDGE_VERSIONS.len())];
    let os = OS_STRINGS[rng.random_range(0..OS_STRINGS.len())];
    let chrome_ver = version.split('.').next().unwrap_or("133");

    format!(
        "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{}.0.0.0 Safari/537.36 Edg/{}",
        os, chrome_ver, version
    )
}

/// 產生一個隨機的桌面瀏覽器 User-Agent
pub fn gen_random_ua() -> String {
    let mut rng = rand::rng();
    match rng.random_range(0..10) {
        0..=5 => gen_chrome_ua(),
        6..=7 => gen_firefox_ua(),
        8 => gen_edge_ua(),
        _ => gen_chrome_ua(),
    }
}
