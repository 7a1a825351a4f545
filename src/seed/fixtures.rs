//! Egyptian demo organization used by the seed endpoint.
//!
//! Departments reference their parent by fixture code and employees
//! reference their manager by position in [`EMPLOYEES`]; both are rewritten to
//! generated record IDs when seeding.

use crate::models::{EmploymentType, Gender};

pub struct DepartmentFixture {
    pub code: &'static str,
    pub name: &'static str,
    pub name_ar: &'static str,
    pub parent: Option<&'static str>,
    pub location: &'static str,
    /// Index into [`EMPLOYEES`] of the department head.
    pub head: Option<usize>,
}

pub struct EmployeeFixture {
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub full_name_ar: &'static str,
    pub department: &'static str,
    pub position: &'static str,
    /// Index into [`EMPLOYEES`] of the direct manager.
    pub manager: Option<usize>,
    pub hire_date: &'static str,
    pub employment_type: EmploymentType,
    pub gender: Gender,
    pub basic_salary: f64,
}

const fn dept(
    code: &'static str,
    name: &'static str,
    name_ar: &'static str,
    parent: Option<&'static str>,
    location: &'static str,
    head: Option<usize>,
) -> DepartmentFixture {
    DepartmentFixture {
        code,
        name,
        name_ar,
        parent,
        location,
        head,
    }
}

pub const DEPARTMENTS: &[DepartmentFixture] = &[
    dept("GM", "General Management", "الإدارة العامة", None, "Cairo", Some(0)),
    dept("HR", "Human Resources", "الموارد البشرية", Some("GM"), "Cairo", Some(1)),
    dept("REC", "Recruitment", "التوظيف", Some("HR"), "Cairo", None),
    dept("PAY", "Payroll", "الرواتب", Some("HR"), "Cairo", Some(3)),
    dept("FIN", "Finance", "المالية", Some("GM"), "Cairo", Some(4)),
    dept("ACC", "Accounting", "المحاسبة", Some("FIN"), "Cairo", Some(5)),
    dept("TAX", "Tax Affairs", "الشؤون الضريبية", Some("FIN"), "Cairo", Some(6)),
    dept("IT", "Information Technology", "تكنولوجيا المعلومات", Some("GM"), "Smart Village", Some(7)),
    dept("DEV", "Software Development", "تطوير البرمجيات", Some("IT"), "Smart Village", Some(9)),
    dept("INF", "Infrastructure", "البنية التحتية", Some("IT"), "Smart Village", Some(10)),
    dept("SAL", "Sales", "المبيعات", Some("GM"), "Cairo", Some(11)),
    dept("SCA", "Sales Cairo", "مبيعات القاهرة", Some("SAL"), "Cairo", Some(12)),
    dept("SAX", "Sales Alexandria", "مبيعات الإسكندرية", Some("SAL"), "Alexandria", Some(13)),
    dept("MKT", "Marketing", "التسويق", Some("GM"), "Cairo", Some(14)),
    dept("OPS", "Operations", "العمليات", Some("GM"), "6th of October City", Some(15)),
    dept("LOG", "Logistics", "اللوجستيات", Some("OPS"), "6th of October City", Some(16)),
    dept("PRC", "Procurement", "المشتريات", Some("OPS"), "6th of October City", Some(17)),
];

#[allow(clippy::too_many_arguments)]
const fn emp(
    first_name: &'static str,
    last_name: &'static str,
    full_name_ar: &'static str,
    department: &'static str,
    position: &'static str,
    manager: Option<usize>,
    hire_date: &'static str,
    gender: Gender,
    basic_salary: f64,
) -> EmployeeFixture {
    EmployeeFixture {
        first_name,
        last_name,
        full_name_ar,
        department,
        position,
        manager,
        hire_date,
        employment_type: EmploymentType::FullTime,
        gender,
        basic_salary,
    }
}

pub const EMPLOYEES: &[EmployeeFixture] = &[
    emp("Ahmed", "Hassan", "أحمد حسن", "GM", "General Manager", None, "2012-01-15", Gender::Male, 85000.0),
    emp("Mona", "Ibrahim", "منى إبراهيم", "HR", "HR Director", Some(0), "2014-03-01", Gender::Female, 45000.0),
    emp("Karim", "Mahmoud", "كريم محمود", "REC", "Recruitment Specialist", Some(1), "2019-06-10", Gender::Male, 18000.0),
    emp("Yasmin", "Fathy", "ياسمين فتحي", "PAY", "Payroll Supervisor", Some(1), "2017-09-03", Gender::Female, 21000.0),
    emp("Omar", "Khaled", "عمر خالد", "FIN", "Finance Director", Some(0), "2013-11-20", Gender::Male, 50000.0),
    emp("Heba", "Mostafa", "هبة مصطفى", "ACC", "Chief Accountant", Some(4), "2016-02-14", Gender::Female, 26000.0),
    emp("Tarek", "Abdelrahman", "طارق عبد الرحمن", "TAX", "Tax Manager", Some(4), "2015-07-01", Gender::Male, 24000.0),
    emp("Mahmoud", "Adel", "محمود عادل", "IT", "IT Director", Some(0), "2014-10-05", Gender::Male, 52000.0),
    emp("Sara", "Ali", "سارة علي", "DEV", "Software Engineer", Some(9), "2021-01-17", Gender::Female, 28000.0),
    emp("Mostafa", "Samir", "مصطفى سمير", "DEV", "Engineering Manager", Some(7), "2018-04-22", Gender::Male, 38000.0),
    emp("Reem", "Gamal", "ريم جمال", "INF", "Infrastructure Lead", Some(7), "2019-08-11", Gender::Female, 30000.0),
    emp("Hany", "Farouk", "هاني فاروق", "SAL", "Sales Director", Some(0), "2013-05-19", Gender::Male, 48000.0),
    emp("Dina", "Youssef", "دينا يوسف", "SCA", "Regional Sales Manager", Some(11), "2017-03-26", Gender::Female, 25000.0),
    emp("Amr", "Nabil", "عمرو نبيل", "SAX", "Regional Sales Manager", Some(11), "2018-12-02", Gender::Male, 24500.0),
    emp("Laila", "Sherif", "ليلى شريف", "MKT", "Marketing Manager", Some(0), "2016-09-12", Gender::Female, 38000.0),
    emp("Islam", "Ramadan", "إسلام رمضان", "OPS", "Operations Director", Some(0), "2014-06-30", Gender::Male, 47000.0),
    emp("Walid", "Hamdy", "وليد حمدي", "LOG", "Logistics Supervisor", Some(15), "2019-02-18", Gender::Male, 21000.0),
    emp("Rania", "Said", "رانيا سعيد", "PRC", "Procurement Lead", Some(15), "2020-10-04", Gender::Female, 22000.0),
    emp("Khaled", "Mansour", "خالد منصور", "ACC", "Accountant", Some(5), "2022-05-08", Gender::Male, 15000.0),
    emp("Aya", "Tawfik", "آية توفيق", "HR", "HR Generalist", Some(1), "2023-02-01", Gender::Female, 14000.0),
];
