use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel navigation label that matches every category.
pub const CATEGORY_ALL: &str = "Semua";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub name: String,
    pub text: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsRecord {
    pub id: u32,
    pub title: String,
    pub category: String,
    /// Publication date, used for display formatting only. Feed order is
    /// seed order, never date order.
    pub date: NaiveDate,
    /// Image reference from the source site. The terminal renders it as a
    /// caption line and never fetches it, so an unreachable URL is harmless.
    pub image: String,
    pub snippet: String,
    pub content: String,
    pub comments: Vec<Comment>,
}

/// Category selector for the feed: the "Semua" sentinel or one exact label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Label(String),
}

impl CategoryFilter {
    pub fn from_label(label: &str) -> Self {
        if label == CATEGORY_ALL {
            CategoryFilter::All
        } else {
            CategoryFilter::Label(label.to_string())
        }
    }

    /// Exact string equality, not case-folded.
    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Label(label) => label == category,
        }
    }

    pub fn display(&self) -> &str {
        match self {
            CategoryFilter::All => CATEGORY_ALL,
            CategoryFilter::Label(label) => label,
        }
    }
}

/// Fixed, in-memory ordered record sequence. Records are never added or
/// removed at runtime; only the owned comment lists are mutable (append
/// only). Nothing is persisted, so a restart resets comments to the seed.
pub struct RecordStore {
    records: Vec<NewsRecord>,
}

impl RecordStore {
    pub fn new(records: Vec<NewsRecord>) -> Self {
        debug_assert!(
            {
                let mut ids: Vec<u32> = records.iter().map(|record| record.id).collect();
                ids.sort_unstable();
                ids.windows(2).all(|pair| pair[0] != pair[1])
            },
            "record ids must be unique"
        );
        Self { records }
    }

    pub fn records(&self) -> &[NewsRecord] {
        &self.records
    }

    pub fn get(&self, id: u32) -> Option<&NewsRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut NewsRecord> {
        self.records.iter_mut().find(|record| record.id == id)
    }

    /// Category labels in first-appearance order, prefixed by the sentinel.
    pub fn navigation_labels(&self) -> Vec<String> {
        let mut labels = vec![CATEGORY_ALL.to_string()];
        for record in &self.records {
            if !labels.iter().any(|label| label == &record.category) {
                labels.push(record.category.clone());
            }
        }
        labels
    }
}

/// Pure filter pass: a record matches when the selector accepts its category
/// AND the query (case-insensitive) occurs in its title or content. Snippet
/// and category text are not searched. Store order is preserved.
pub fn filter_ids(records: &[NewsRecord], selector: &CategoryFilter, query: &str) -> Vec<u32> {
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|record| {
            if !selector.matches(&record.category) {
                return false;
            }
            if needle.is_empty() {
                return true;
            }
            record.title.to_lowercase().contains(&needle)
                || record.content.to_lowercase().contains(&needle)
        })
        .map(|record| record.id)
        .collect()
}

fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("seed date is valid")
}

fn stamp(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("seed timestamp is valid")
}

fn comment(name: &str, text: &str, date: DateTime<Utc>) -> Comment {
    Comment {
        name: name.to_string(),
        text: text.to_string(),
        date,
    }
}

struct Seed {
    id: u32,
    title: &'static str,
    category: &'static str,
    date: NaiveDate,
    image: &'static str,
    snippet: &'static str,
    content: &'static str,
    comments: Vec<Comment>,
}

impl From<Seed> for NewsRecord {
    fn from(seed: Seed) -> Self {
        NewsRecord {
            id: seed.id,
            title: seed.title.to_string(),
            category: seed.category.to_string(),
            date: seed.date,
            image: seed.image.to_string(),
            snippet: seed.snippet.to_string(),
            content: seed.content.to_string(),
            comments: seed.comments,
        }
    }
}

/// The record set of the SMPN 264 Jakarta site, defined entirely in-process.
pub fn seed_store() -> RecordStore {
    let seeds = vec![
        Seed {
            id: 1,
            title: "Pendaftaran Siswa Baru Tahun Ajaran 2024/2025 Dibuka!",
            category: "Pengumuman",
            date: day(2024, 5, 30),
            image: "https://placehold.co/600x400/ADD8E6/000000?text=Pendaftaran",
            snippet: "SMPN 264 Jakarta dengan bangga mengumumkan pembukaan pendaftaran siswa baru untuk tahun ajaran 2024/2025. Segera daftarkan putra-putri Anda!",
            content: "Pendaftaran siswa baru di SMPN 264 Jakarta untuk tahun ajaran 2024/2025 telah resmi dibuka. Kami mengundang calon siswa dan orang tua untuk mengunjungi situs web sekolah kami atau datang langsung ke sekretariat pendaftaran. Berbagai program unggulan dan fasilitas modern siap mendukung perkembangan akademik dan non-akademik siswa. Jangan lewatkan kesempatan ini untuk bergabung dengan keluarga besar SMPN 264 Jakarta! Detail lengkap mengenai persyaratan dan jadwal dapat ditemukan di halaman PSB kami.",
            comments: vec![
                comment(
                    "Budi Santoso",
                    "Berita yang sangat informatif! Terima kasih.",
                    stamp(2024, 6, 1, 10, 0),
                ),
                comment(
                    "Siti Aminah",
                    "Semoga pendaftaran berjalan lancar.",
                    stamp(2024, 6, 1, 11, 30),
                ),
            ],
        },
        Seed {
            id: 2,
            title: "Perlombaan Sains Tingkat Kota Berlangsung Sukses",
            category: "Prestasi",
            date: day(2024, 5, 28),
            image: "https://placehold.co/600x400/90EE90/000000?text=Sains",
            snippet: "Siswa-siswi SMPN 264 Jakarta menunjukkan performa luar biasa dalam perlombaan sains tingkat kota, meraih beberapa penghargaan.",
            content: "Perlombaan Sains Tingkat Kota yang diadakan minggu lalu menjadi ajang pembuktian bagi bakat-bakat muda dari SMPN 264 Jakarta. Tim perwakilan sekolah berhasil meraih juara 1 dalam kategori Fisika dan juara 3 dalam kategori Biologi. Prestasi ini merupakan hasil kerja keras dan dedikasi siswa serta bimbingan dari guru-guru pembimbing. Selamat kepada para pemenang! Kami berharap mereka dapat terus menginspirasi siswa lain.",
            comments: vec![comment(
                "Guru Pembimbing",
                "Bangga sekali dengan pencapaian anak-anak!",
                stamp(2024, 6, 1, 14, 0),
            )],
        },
        Seed {
            id: 3,
            title: "Kegiatan Ekstrakurikuler Baru: Klub Robotika",
            category: "Kegiatan",
            date: day(2024, 5, 25),
            image: "https://placehold.co/600x400/FFD700/000000?text=Robotika",
            snippet: "SMPN 264 Jakarta meluncurkan klub robotika baru untuk mengembangkan minat siswa dalam teknologi dan rekayasa.",
            content: "Untuk memperkaya pengalaman belajar siswa, SMPN 264 Jakarta kini resmi meluncurkan klub robotika. Klub ini akan menjadi wadah bagi siswa yang tertarik pada dunia teknologi, pemrograman, dan rekayasa. Dengan bimbingan dari instruktur ahli, siswa akan belajar merancang, membangun, dan memprogram robot. Mari bergabung dan wujudkan ide-ide inovatif Anda! Pendaftaran dibuka setiap hari kerja.",
            comments: Vec::new(),
        },
        Seed {
            id: 4,
            title: "Workshop Penulisan Kreatif untuk Siswa Kelas 9",
            category: "Akademik",
            date: day(2024, 5, 20),
            image: "https://placehold.co/600x400/FFB6C1/000000?text=Menulis",
            snippet: "Workshop intensif diadakan untuk meningkatkan kemampuan menulis kreatif siswa kelas 9, persiapan menghadapi ujian.",
            content: "Dalam rangka mempersiapkan siswa kelas 9 menghadapi ujian akhir dan mengembangkan potensi menulis mereka, SMPN 264 Jakarta menyelenggarakan workshop penulisan kreatif. Workshop ini menghadirkan penulis profesional yang berbagi tips dan teknik menulis efektif. Diharapkan, kegiatan ini dapat memotivasi siswa untuk lebih mencintai dunia literasi dan meningkatkan nilai ujian mereka.",
            comments: vec![comment(
                "Orang Tua Siswa",
                "Acara yang sangat bermanfaat untuk anak-anak.",
                stamp(2024, 5, 21, 9, 0),
            )],
        },
        Seed {
            id: 5,
            title: "Pengumuman Libur Hari Raya Idul Adha",
            category: "Pengumuman",
            date: day(2024, 6, 10),
            image: "https://placehold.co/600x400/DDA0DD/000000?text=Libur",
            snippet: "Sekolah akan diliburkan pada tanggal 17-18 Juni 2024 dalam rangka Hari Raya Idul Adha.",
            content: "Diberitahukan kepada seluruh siswa, guru, dan staf SMPN 264 Jakarta bahwa kegiatan belajar mengajar akan diliburkan pada tanggal 17 dan 18 Juni 2024 dalam rangka memperingati Hari Raya Idul Adha 1445 H. Kegiatan sekolah akan kembali normal pada tanggal 19 Juni 2024. Selamat merayakan Idul Adha bagi yang merayakan. Mohon diperhatikan jadwal ini.",
            comments: Vec::new(),
        },
        Seed {
            id: 6,
            title: "Tim Basket Putri Meraih Juara 2 di Turnamen Antar Sekolah",
            category: "Prestasi",
            date: day(2024, 5, 15),
            image: "https://placehold.co/600x400/B0C4DE/000000?text=Basket",
            snippet: "Tim basket putri SMPN 264 Jakarta menunjukkan semangat juang tinggi dan berhasil meraih posisi kedua.",
            content: "Tim basket putri SMPN 264 Jakarta kembali menorehkan prestasi gemilang dengan meraih juara 2 dalam Turnamen Basket Antar Sekolah se-Jakarta Selatan. Pertandingan final yang sengit menunjukkan kegigihan dan kerja sama tim yang solid. Kami bangga dengan pencapaian ini dan berharap dapat terus meningkatkan prestasi di masa mendatang. Dukungan dari seluruh warga sekolah sangat berarti.",
            comments: vec![comment(
                "Pelatih Basket",
                "Luar biasa! Terus berlatih dan raih juara 1!",
                stamp(2024, 5, 16, 18, 0),
            )],
        },
        Seed {
            id: 7,
            title: "Kunjungan Edukasi ke Museum Nasional",
            category: "Kegiatan",
            date: day(2024, 5, 10),
            image: "https://placehold.co/600x400/C0C0C0/000000?text=Museum",
            snippet: "Siswa kelas 7 dan 8 melakukan kunjungan edukasi ke Museum Nasional untuk memperkaya pengetahuan sejarah dan budaya.",
            content: "Sebagai bagian dari program pembelajaran interaktif, siswa kelas 7 dan 8 SMPN 264 Jakarta baru-baru ini mengunjungi Museum Nasional. Kunjungan ini bertujuan untuk memberikan pengalaman belajar langsung tentang sejarah, seni, dan budaya Indonesia. Para siswa sangat antusias mengikuti tur dan sesi diskusi yang diadakan. Kegiatan ini diharapkan dapat menumbuhkan rasa cinta tanah air dan wawasan yang lebih luas.",
            comments: Vec::new(),
        },
        Seed {
            id: 8,
            title: "Jadwal Ujian Akhir Semester Genap",
            category: "Akademik",
            date: day(2024, 6, 5),
            image: "https://placehold.co/600x400/FFDAB9/000000?text=Ujian",
            snippet: "Informasi lengkap mengenai jadwal Ujian Akhir Semester (UAS) Genap untuk semua tingkatan kelas.",
            content: "Diberitahukan kepada seluruh siswa SMPN 264 Jakarta, jadwal Ujian Akhir Semester (UAS) Genap telah dirilis. Ujian akan dilaksanakan mulai tanggal 24 Juni hingga 28 Juni 2024. Mohon persiapkan diri dengan baik dan pastikan untuk memeriksa jadwal yang telah ditempel di papan pengumuman sekolah atau diakses melalui portal siswa. Selamat belajar dan semoga sukses!",
            comments: Vec::new(),
        },
        Seed {
            id: 9,
            title: "Perayaan Hari Guru Nasional di SMPN 264 Jakarta",
            category: "Kegiatan",
            date: day(2024, 11, 25),
            image: "assets/img/berita/berita-2.jpeg",
            snippet: "SMPN 264 Jakarta merayakan Hari Guru Nasional dengan berbagai kegiatan dan apresiasi untuk para pahlawan tanpa tanda jasa.",
            content: "Pada tanggal 25 November, seluruh warga SMPN 264 Jakarta dengan penuh suka cita merayakan Hari Guru Nasional. Berbagai acara seperti upacara bendera, penampilan seni dari siswa, dan pemberian penghargaan kepada guru-guru berprestasi diselenggarakan untuk menghormati dedikasi dan pengabdian para pendidik. Acara berlangsung meriah dan penuh kehangatan, menunjukkan rasa terima kasih yang mendalam dari siswa dan orang tua.",
            comments: vec![comment(
                "Alumni 2020",
                "Selamat Hari Guru! Kenangan indah bersama bapak/ibu guru.",
                stamp(2024, 11, 25, 15, 0),
            )],
        },
        Seed {
            id: 10,
            title: "Program Tahunan 'Jumat Bersih' Digelar Kembali",
            category: "Umum",
            date: day(2024, 5, 3),
            image: "https://placehold.co/600x400/F0E68C/000000?text=Jumat+Bersih",
            snippet: "Program 'Jumat Bersih' kembali dilaksanakan untuk menjaga kebersihan dan kenyamanan lingkungan sekolah.",
            content: "Dalam upaya menjaga kebersihan dan menciptakan lingkungan belajar yang nyaman, SMPN 264 Jakarta secara rutin menggelar program 'Jumat Bersih'. Seluruh siswa, guru, dan staf berpartisipasi aktif dalam membersihkan area sekolah. Kegiatan ini tidak hanya bertujuan untuk kebersihan, tetapi juga untuk menumbuhkan rasa tanggung jawab dan kebersamaan di antara warga sekolah. Mari kita jaga kebersihan sekolah kita bersama!",
            comments: Vec::new(),
        },
        Seed {
            id: 11,
            title: "Pembukaan Kelas Coding untuk Siswa",
            category: "Akademik",
            date: day(2025, 5, 20),
            image: "https://placehold.co/1200x400/AEC6CF/000000?text=Kelas+Coding",
            snippet: "SMPN 264 Jakarta meluncurkan kelas coding baru untuk mempersiapkan siswa menghadapi era digital.",
            content: "Merespon perkembangan teknologi yang pesat, SMPN 264 Jakarta dengan bangga membuka kelas coding bagi siswa-siswi. Program ini akan memperkenalkan dasar-dasar pemrograman, logika komputasi, dan pengembangan aplikasi sederhana. Diharapkan, kelas ini dapat membekali siswa dengan keterampilan digital yang relevan dan menumbuhkan minat mereka di bidang teknologi informasi.",
            comments: Vec::new(),
        },
        Seed {
            id: 12,
            title: "Festival Seni dan Budaya Sekolah",
            category: "Kegiatan",
            date: day(2025, 5, 15),
            image: "https://placehold.co/1200x400/FFDAB9/000000?text=Festival+Seni",
            snippet: "Festival Seni dan Budaya tahunan SMPN 264 Jakarta sukses digelar dengan berbagai penampilan menarik.",
            content: "SMPN 264 Jakarta kembali menggelar Festival Seni dan Budaya yang meriah. Acara ini menampilkan beragam bakat siswa dalam seni tari, musik, teater, dan pameran karya seni rupa. Festival ini bertujuan untuk mengembangkan kreativitas siswa dan melestarikan budaya lokal. Antusiasme penonton sangat tinggi, menunjukkan dukungan penuh terhadap kegiatan positif ini.",
            comments: Vec::new(),
        },
        Seed {
            id: 13,
            title: "Pengumuman Hasil Ujian Nasional",
            category: "Pengumuman",
            date: day(2025, 5, 10),
            image: "https://placehold.co/1200x400/D8BFD8/000000?text=Hasil+Ujian",
            snippet: "Hasil Ujian Nasional untuk siswa kelas 9 telah diumumkan. Selamat kepada para siswa yang telah lulus!",
            content: "Dengan ini diumumkan bahwa hasil Ujian Nasional untuk siswa kelas 9 SMPN 264 Jakarta telah tersedia. Para siswa dapat melihat hasilnya melalui portal sekolah atau datang langsung ke sekolah. Kami mengucapkan selamat kepada seluruh siswa yang telah berhasil menyelesaikan pendidikan di jenjang SMP. Semoga sukses dalam melanjutkan pendidikan ke jenjang yang lebih tinggi.",
            comments: Vec::new(),
        },
    ];

    RecordStore::new(seeds.into_iter().map(NewsRecord::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_store() -> Vec<NewsRecord> {
        let mk = |id: u32, title: &str, category: &str, content: &str| NewsRecord {
            id,
            title: title.to_string(),
            category: category.to_string(),
            date: day(2024, 1, 1),
            image: String::new(),
            snippet: format!("snippet {id}"),
            content: content.to_string(),
            comments: Vec::new(),
        };
        vec![
            mk(1, "Libur sekolah", "Pengumuman", "Sekolah libur minggu depan."),
            mk(2, "Turnamen futsal", "Kegiatan", "Tim futsal bertanding hari Sabtu."),
            mk(3, "Jadwal ujian", "Pengumuman", "Ujian dimulai tanggal 24."),
        ]
    }

    #[test]
    fn all_and_empty_query_returns_everything_in_order() {
        let records = tiny_store();
        let ids = filter_ids(&records, &CategoryFilter::All, "");
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn category_filter_is_exact_and_keeps_order() {
        let records = tiny_store();
        let selector = CategoryFilter::from_label("Pengumuman");
        assert_eq!(filter_ids(&records, &selector, ""), vec![1, 3]);
        // Exact string match only; no case folding.
        let lower = CategoryFilter::from_label("pengumuman");
        assert!(filter_ids(&records, &lower, "").is_empty());
    }

    #[test]
    fn query_searches_content_not_just_title() {
        let records = tiny_store();
        // "Sabtu" appears only in record 2's content.
        assert_eq!(filter_ids(&records, &CategoryFilter::All, "sabtu"), vec![2]);
    }

    #[test]
    fn query_is_case_insensitive_against_title() {
        let records = tiny_store();
        assert_eq!(filter_ids(&records, &CategoryFilter::All, "LIBUR"), vec![1]);
    }

    #[test]
    fn query_does_not_match_snippet() {
        let records = tiny_store();
        assert!(filter_ids(&records, &CategoryFilter::All, "snippet 2").is_empty());
    }

    #[test]
    fn unmatched_inputs_yield_empty_not_error() {
        let records = tiny_store();
        let selector = CategoryFilter::from_label("Prestasi");
        assert!(filter_ids(&records, &selector, "").is_empty());
        assert!(filter_ids(&records, &CategoryFilter::All, "zzz").is_empty());
    }

    #[test]
    fn seed_ids_are_unique_and_order_is_definition_order() {
        let store = seed_store();
        let ids: Vec<u32> = store.records().iter().map(|record| record.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), ids.len());
        // Definition order, not date order: record 9 (Nov 2024) sits between
        // 8 (Jun 2024) and 10 (May 2024).
        assert_eq!(ids[7..10], [8, 9, 10]);
    }

    #[test]
    fn navigation_labels_start_with_sentinel() {
        let store = seed_store();
        let labels = store.navigation_labels();
        assert_eq!(labels[0], CATEGORY_ALL);
        assert_eq!(
            &labels[1..],
            ["Pengumuman", "Prestasi", "Kegiatan", "Akademik", "Umum"]
        );
    }

    #[test]
    fn lookup_by_id() {
        let store = seed_store();
        assert_eq!(store.get(5).map(|record| record.id), Some(5));
        assert!(store.get(99).is_none());
    }
}
